pub mod config;
pub mod spreadsheets;
