use crate::domain::model::{CellValue, Credential, Spreadsheet, SpreadsheetRef, Worksheet};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Turns a credential into an authenticated session with a spreadsheet provider.
///
/// Implementations must fail before any network call when the credential
/// itself is unusable.
#[async_trait]
pub trait Authenticator: Send + Sync {
    type Session: SpreadsheetService;

    async fn authenticate(&self, credential: &Credential) -> Result<Self::Session>;
}

/// An authenticated, read-only view of a spreadsheet provider.
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    async fn open_spreadsheet(&self, spreadsheet: &SpreadsheetRef) -> Result<Spreadsheet>;

    async fn worksheet(&self, spreadsheet: &Spreadsheet, title: &str) -> Result<Worksheet>;

    /// All rows of the worksheet, header row included, in sheet order.
    async fn worksheet_values(&self, worksheet: &Worksheet) -> Result<Vec<Vec<CellValue>>>;
}
