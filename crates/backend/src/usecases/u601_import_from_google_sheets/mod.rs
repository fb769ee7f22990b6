pub mod column_mapper;
pub mod error;
pub mod executor;
pub mod schema;
pub mod status_tracker;
pub mod timer_slot;
pub mod transformer;

#[cfg(test)]
pub mod test_support;

pub use error::SyncError;
pub use executor::{ImportOutcome, SyncController, SyncSettings};
