//! DTOs shared between the dashboard backend and its presentation clients.

pub mod dashboards;
pub mod domain;
pub mod enums;
pub mod shared;
pub mod usecases;
