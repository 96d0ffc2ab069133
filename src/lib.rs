//! expense-export reads the transactions recorded by the Expense Manager app from its SQLite
//! backup and publishes them as a CSV file, a Google sheet, or both.

mod api;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
#[cfg(test)]
mod test;
mod utils;

pub use api::Mode;
pub use config::Credentials;
pub use error::{Error, ErrorType, Result};
