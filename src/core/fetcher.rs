use crate::config::FetchConfig;
use crate::core::records::rows_to_records;
use crate::core::{Authenticator, CellValue, Record, SpreadsheetService};
use crate::utils::error::{FetchError, Result};
use std::io::Write;

/// Fetches every record of one worksheet and prints it as a JSON array.
pub struct SheetFetcher<A: Authenticator> {
    authenticator: A,
    config: FetchConfig,
}

impl<A: Authenticator> SheetFetcher<A> {
    pub fn new(authenticator: A, config: FetchConfig) -> Self {
        Self {
            authenticator,
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub async fn fetch(&self) -> Result<Vec<Record>> {
        tracing::info!("Authenticating with {}", self.config.credential.path().display());
        let session = self.authenticator.authenticate(&self.config.credential).await?;

        tracing::info!("Opening spreadsheet {}", self.config.spreadsheet);
        let spreadsheet = session.open_spreadsheet(&self.config.spreadsheet).await?;

        tracing::debug!("Resolving worksheet '{}'", self.config.worksheet);
        let worksheet = session.worksheet(&spreadsheet, &self.config.worksheet).await?;

        tracing::info!("Reading worksheet '{}'", worksheet.title);
        let rows = session.worksheet_values(&worksheet).await?;
        tracing::debug!("Fetched {} rows (header included)", rows.len());

        let mut records = rows_to_records(rows, &self.config.records)?;

        if let Some(agent_id) = &self.config.agent_id {
            for record in &mut records {
                record.insert("agent_id", CellValue::Text(agent_id.clone()));
            }
        }

        Ok(records)
    }

    /// Fetches and writes the whole document in one go. Nothing is written
    /// when any step fails.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<usize> {
        let records = self.fetch().await?;
        let document = render(&records, self.config.pretty)?;

        out.write_all(document.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;

        tracing::info!("Printed {} records", records.len());
        Ok(records.len())
    }
}

pub fn render(records: &[Record], pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    };
    rendered.map_err(FetchError::Serialization)
}
