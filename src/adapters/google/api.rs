//! Wire types and helpers for the Google Drive v3 and Sheets v4 REST APIs.

use crate::domain::model::{CellValue, Spreadsheet, Worksheet};
use crate::utils::error::{CredentialError, FetchError, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    pub spreadsheet_id: String,
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SpreadsheetProperties {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ValueRange {
    // 空白工作表不會回傳 values 欄位
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl From<SpreadsheetMetadata> for Spreadsheet {
    fn from(meta: SpreadsheetMetadata) -> Self {
        let id = meta.spreadsheet_id;
        let title = meta.properties.title;
        let worksheets = meta
            .sheets
            .into_iter()
            .map(|sheet| Worksheet {
                spreadsheet_id: id.clone(),
                spreadsheet_title: title.clone(),
                sheet_id: sheet.properties.sheet_id,
                title: sheet.properties.title,
            })
            .collect();
        Spreadsheet {
            id,
            title,
            worksheets,
        }
    }
}

/// Appends path segments to an API base URL, percent-encoding each one.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| FetchError::InvalidConfigValue {
        field: "api_url".to_string(),
        value: base.to_string(),
        reason: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidConfigValue {
            field: "api_url".to_string(),
            value: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Drive query matching a spreadsheet by exact name.
pub fn title_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME_TYPE
    )
}

/// A1 range covering a whole sheet, e.g. `'Form responses 1'`.
pub fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Values are requested as `FORMATTED_VALUE`, so cells normally arrive as the
/// text shown in the sheet. Other JSON types are still mapped in case the
/// service hands them back.
pub fn cell_from_json(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::String(s) => CellValue::text(s),
        Value::Number(n) => CellValue::Number(n),
        Value::Bool(true) => CellValue::Text("TRUE".to_string()),
        Value::Bool(false) => CellValue::Text("FALSE".to_string()),
        other => CellValue::Text(other.to_string()),
    }
}

/// Pulls a readable message out of a Google error body. Handles both the
/// OAuth shape (`{"error": "...", "error_description": "..."}`) and the API
/// shape (`{"error": {"message": "..."}}`).
pub fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| match v.get("error") {
        Some(Value::Object(err)) => err.get("message").and_then(Value::as_str),
        Some(Value::String(code)) => v
            .get("error_description")
            .and_then(Value::as_str)
            .or(Some(code.as_str())),
        _ => None,
    });

    match message {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => "empty response body".to_string(),
        None => body.chars().take(200).collect(),
    }
}

/// Maps a failed API response to an error. 401 means the token was not
/// accepted; other client errors go through `on_client_error`; anything
/// else is a service failure.
pub fn status_error<F>(status: StatusCode, body: &str, on_client_error: F) -> FetchError
where
    F: FnOnce(u16, String) -> FetchError,
{
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED => CredentialError::Rejected {
            status: status.as_u16(),
            message,
        }
        .into(),
        StatusCode::TOO_MANY_REQUESTS => FetchError::Service {
            status: status.as_u16(),
            message,
        },
        s if s.is_client_error() => on_client_error(s.as_u16(), message),
        s => FetchError::Service {
            status: s.as_u16(),
            message,
        },
    }
}
