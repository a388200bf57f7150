pub mod fetcher;
pub mod records;

pub use crate::domain::model::{CellValue, Record};
pub use crate::domain::ports::{Authenticator, SpreadsheetService};
pub use crate::utils::error::Result;
