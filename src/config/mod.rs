pub mod toml_config;

use crate::core::records::RecordOptions;
use crate::domain::model::{Credential, SpreadsheetRef};
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{
    require, validate_agent_id, validate_api_base, validate_credential_path,
    validate_spreadsheet_key, validate_spreadsheet_title, validate_timeout,
    validate_worksheet_title, Validate,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sheet-fetch")]
#[command(about = "Print every record of a Google Sheets worksheet as JSON")]
#[command(version)]
pub struct CliConfig {
    /// Optional TOML configuration file
    #[arg(short, long, env = "SHEET_FETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the service account key file (JSON)
    #[arg(long, env = "SHEET_FETCH_CREDENTIALS")]
    pub credentials: Option<String>,

    /// Title of the spreadsheet to open
    #[arg(long, env = "SHEET_FETCH_SPREADSHEET", conflicts_with = "spreadsheet_key")]
    pub spreadsheet: Option<String>,

    /// Open the spreadsheet by its id instead of its title
    #[arg(long, env = "SHEET_FETCH_SPREADSHEET_KEY")]
    pub spreadsheet_key: Option<String>,

    /// Title of the worksheet (tab) to read
    #[arg(long, env = "SHEET_FETCH_WORKSHEET")]
    pub worksheet: Option<String>,

    /// Convert text cells that look like numbers into JSON numbers
    #[arg(long, overrides_with = "no_numericise")]
    pub numericise: bool,

    /// Keep every cell as text, even when the config file enables numericise
    #[arg(long, overrides_with = "numericise")]
    pub no_numericise: bool,

    /// Add an "agent_id" field with this value to every record
    #[arg(long, env = "SHEET_FETCH_AGENT_ID")]
    pub agent_id: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long, overrides_with = "no_pretty")]
    pub pretty: bool,

    /// Print compact JSON, even when the config file enables pretty
    #[arg(long, overrides_with = "pretty")]
    pub no_pretty: bool,

    /// Timeout for each request to the spreadsheet service, in seconds
    #[arg(long, env = "SHEET_FETCH_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[arg(long, env = "SHEET_FETCH_SHEETS_API_URL", hide = true)]
    pub sheets_api_url: Option<String>,

    #[arg(long, env = "SHEET_FETCH_DRIVE_API_URL", hide = true)]
    pub drive_api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Turns a `--flag` / `--no-flag` pair into "unset" when neither was given,
/// so the config file value still applies.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub sheets_api_url: String,
    pub drive_api_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sheets_api_url: DEFAULT_SHEETS_API_URL.to_string(),
            drive_api_url: DEFAULT_DRIVE_API_URL.to_string(),
        }
    }
}

/// Everything one fetch needs, resolved from the command line, the
/// environment and the optional config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub credential: Credential,
    pub spreadsheet: SpreadsheetRef,
    pub worksheet: String,
    pub records: RecordOptions,
    pub agent_id: Option<String>,
    pub pretty: bool,
    pub http: HttpConfig,
}

impl FetchConfig {
    pub fn new(
        credential: impl Into<PathBuf>,
        spreadsheet: SpreadsheetRef,
        worksheet: impl Into<String>,
    ) -> Self {
        Self {
            credential: Credential::new(credential),
            spreadsheet,
            worksheet: worksheet.into(),
            records: RecordOptions::default(),
            agent_id: None,
            pretty: false,
            http: HttpConfig::default(),
        }
    }

    /// Loads the config file named by `--config`, if any, and merges it
    /// under the command line values.
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: &CliConfig, file: TomlConfig) -> Result<Self> {
        let TomlConfig { source, output, http } = file;

        let credentials = cli.credentials.clone().or(source.credentials);
        let credentials = require("credentials", &credentials)?;

        let spreadsheet = match (&cli.spreadsheet, &cli.spreadsheet_key) {
            (Some(title), _) => SpreadsheetRef::Title(title.clone()),
            (None, Some(key)) => SpreadsheetRef::Key(key.clone()),
            (None, None) => match (source.spreadsheet, source.spreadsheet_key) {
                (Some(_), Some(_)) => {
                    return Err(FetchError::Config {
                        message: "set either source.spreadsheet or source.spreadsheet_key, not both"
                            .to_string(),
                    })
                }
                (Some(title), None) => SpreadsheetRef::Title(title),
                (None, Some(key)) => SpreadsheetRef::Key(key),
                (None, None) => {
                    return Err(FetchError::MissingConfig {
                        field: "spreadsheet".to_string(),
                    })
                }
            },
        };

        let worksheet = cli.worksheet.clone().or(source.worksheet);
        let worksheet = require("worksheet", &worksheet)?;

        let timeout_secs = cli
            .timeout_secs
            .or(http.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            credential: Credential::new(credentials),
            spreadsheet,
            worksheet: worksheet.clone(),
            records: RecordOptions {
                numericise: switch(cli.numericise, cli.no_numericise)
                    .or(output.numericise)
                    .unwrap_or(false),
            },
            agent_id: cli.agent_id.clone().or(output.agent_id),
            pretty: switch(cli.pretty, cli.no_pretty)
                .or(output.pretty)
                .unwrap_or(false),
            http: HttpConfig {
                timeout: Duration::from_secs(timeout_secs),
                sheets_api_url: cli
                    .sheets_api_url
                    .clone()
                    .or(http.sheets_api_url)
                    .unwrap_or_else(|| DEFAULT_SHEETS_API_URL.to_string()),
                drive_api_url: cli
                    .drive_api_url
                    .clone()
                    .or(http.drive_api_url)
                    .unwrap_or_else(|| DEFAULT_DRIVE_API_URL.to_string()),
            },
        })
    }
}

impl Validate for FetchConfig {
    fn validate(&self) -> Result<()> {
        validate_credential_path(self.credential.path())?;

        match &self.spreadsheet {
            SpreadsheetRef::Title(title) => validate_spreadsheet_title(title)?,
            SpreadsheetRef::Key(key) => validate_spreadsheet_key(key)?,
        }
        validate_worksheet_title(&self.worksheet)?;

        if let Some(agent_id) = &self.agent_id {
            validate_agent_id(agent_id)?;
        }

        validate_timeout(self.http.timeout)?;
        validate_api_base("sheets_api_url", &self.http.sheets_api_url)?;
        validate_api_base("drive_api_url", &self.http.drive_api_url)?;

        Ok(())
    }
}
