pub mod seed;
pub mod service;
pub mod store;

pub use service::DashboardError;
pub use store::DashboardStore;
