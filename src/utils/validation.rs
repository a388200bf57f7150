use crate::utils::error::{FetchError, Result};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Google rejects worksheet (tab) titles longer than this.
pub const MAX_WORKSHEET_TITLE_CHARS: usize = 100;
pub const MAX_TIMEOUT_SECS: u64 = 600;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> FetchError {
    FetchError::InvalidConfigValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Returns the value of a setting that neither the command line, the
/// environment nor the config file may leave out.
pub fn require<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| FetchError::MissingConfig {
        field: field.to_string(),
    })
}

pub fn validate_credential_path(path: &Path) -> Result<()> {
    let shown = path.display();
    if path.as_os_str().is_empty() {
        return Err(invalid("credentials", shown, "the key file path is empty"));
    }
    if path.to_string_lossy().contains('\0') {
        return Err(invalid("credentials", shown, "the key file path contains a NUL byte"));
    }
    if path.is_dir() {
        return Err(invalid(
            "credentials",
            shown,
            "expected the service account JSON key file, got a directory",
        ));
    }
    Ok(())
}

/// Titles are matched exactly, so only a blank title is rejected here.
pub fn validate_spreadsheet_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(invalid("spreadsheet", title, "the spreadsheet title is blank"));
    }
    Ok(())
}

/// Spreadsheet ids are the URL-safe token between `/d/` and `/edit` in the
/// sheet's address.
pub fn validate_spreadsheet_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid("spreadsheet_key", key, "the spreadsheet id is empty"));
    }
    if key.contains('/') {
        return Err(invalid(
            "spreadsheet_key",
            key,
            "pass the id from the spreadsheet URL, not the whole URL",
        ));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(invalid(
            "spreadsheet_key",
            key,
            "a spreadsheet id only holds letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

pub fn validate_worksheet_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(invalid("worksheet", title, "the worksheet title is blank"));
    }
    if title.chars().count() > MAX_WORKSHEET_TITLE_CHARS {
        return Err(invalid(
            "worksheet",
            title,
            format!("worksheet titles are at most {} characters", MAX_WORKSHEET_TITLE_CHARS),
        ));
    }
    Ok(())
}

pub fn validate_agent_id(agent_id: &str) -> Result<()> {
    if agent_id.trim().is_empty() {
        return Err(invalid("agent_id", agent_id, "the agent id is blank"));
    }
    Ok(())
}

pub fn validate_timeout(timeout: Duration) -> Result<()> {
    let secs = timeout.as_secs();
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(invalid(
            "timeout_secs",
            secs,
            format!("the request timeout must be between 1 and {} seconds", MAX_TIMEOUT_SECS),
        ));
    }
    Ok(())
}

/// API base URLs get path segments and a query appended, so they must be
/// plain http(s) origins (optionally with a path prefix).
pub fn validate_api_base(field: &str, base: &str) -> Result<()> {
    let url = Url::parse(base).map_err(|e| invalid(field, base, format!("not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            base,
            format!("the API is only reachable over http(s), not {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, base, "the API URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(field, base, "the API URL must not carry a query or fragment"));
    }
    Ok(())
}
