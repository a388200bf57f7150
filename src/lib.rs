pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::google::GoogleSheets;
pub use crate::config::{CliConfig, FetchConfig};
pub use crate::core::{fetcher::SheetFetcher, records::RecordOptions};
pub use crate::domain::model::{CellValue, Credential, Record, SpreadsheetRef};
pub use crate::utils::error::{FetchError, Result};
