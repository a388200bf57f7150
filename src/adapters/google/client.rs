use crate::adapters::google::api::{
    self, cell_from_json, endpoint, sheet_range, title_query, DriveFileList, SpreadsheetMetadata,
    ValueRange,
};
use crate::adapters::google::auth::ServiceAccountKey;
use crate::config::HttpConfig;
use crate::core::{Authenticator, SpreadsheetService};
use crate::domain::model::{CellValue, Credential, Spreadsheet, SpreadsheetRef, Worksheet};
use crate::utils::error::{FetchError, ResolutionError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

const SPREADSHEET_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties";

/// Google Sheets provider authenticated with a service account key.
pub struct GoogleSheets {
    client: Client,
    http: HttpConfig,
}

impl GoogleSheets {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(http.timeout)
            .user_agent(concat!("sheet-fetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            http: http.clone(),
        })
    }
}

#[async_trait]
impl Authenticator for GoogleSheets {
    type Session = GoogleSession;

    async fn authenticate(&self, credential: &Credential) -> Result<GoogleSession> {
        let key = ServiceAccountKey::load(credential.path()).await?;
        tracing::debug!("Authenticating as {}", key.account().client_email);

        let token = key.fetch_access_token(&self.client).await?;
        tracing::debug!("Access token obtained (expires in {:?}s)", token.expires_in);

        Ok(GoogleSession {
            client: self.client.clone(),
            access_token: token.access_token,
            sheets_api_url: self.http.sheets_api_url.clone(),
            drive_api_url: self.http.drive_api_url.clone(),
        })
    }
}

pub struct GoogleSession {
    client: Client,
    access_token: String,
    sheets_api_url: String,
    drive_api_url: String,
}

impl GoogleSession {
    async fn get_json<T, F>(&self, url: Url, on_client_error: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(u16, String) -> FetchError,
    {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(api::status_error(status, &body, on_client_error));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Service {
            status: status.as_u16(),
            message: format!("unexpected response body: {}", e),
        })
    }

    async fn find_by_title(&self, title: &str) -> Result<String> {
        let mut url = endpoint(&self.drive_api_url, &["drive", "v3", "files"])?;
        url.query_pairs_mut()
            .append_pair("q", &title_query(title))
            .append_pair("fields", "files(id,name)")
            .append_pair("supportsAllDrives", "true")
            .append_pair("includeItemsFromAllDrives", "true");

        let list: DriveFileList = self
            .get_json(url, |status, message| {
                ResolutionError::SpreadsheetInaccessible {
                    spreadsheet: format!("'{}'", title),
                    status,
                    message,
                }
                .into()
            })
            .await?;

        // 只接受名稱完全相同的檔案
        list.files
            .into_iter()
            .find(|file| file.name == title)
            .map(|file| file.id)
            .ok_or_else(|| {
                ResolutionError::SpreadsheetNotFound {
                    title: title.to_string(),
                }
                .into()
            })
    }

    async fn metadata(&self, id: &str, reference: &SpreadsheetRef) -> Result<SpreadsheetMetadata> {
        let mut url = endpoint(&self.sheets_api_url, &["v4", "spreadsheets", id])?;
        url.query_pairs_mut().append_pair("fields", SPREADSHEET_FIELDS);

        self.get_json(url, |status, message| {
            ResolutionError::SpreadsheetInaccessible {
                spreadsheet: reference.to_string(),
                status,
                message,
            }
            .into()
        })
        .await
    }
}

#[async_trait]
impl SpreadsheetService for GoogleSession {
    async fn open_spreadsheet(&self, spreadsheet: &SpreadsheetRef) -> Result<Spreadsheet> {
        let id = match spreadsheet {
            SpreadsheetRef::Title(title) => self.find_by_title(title).await?,
            SpreadsheetRef::Key(key) => key.clone(),
        };
        let meta = self.metadata(&id, spreadsheet).await?;
        Ok(Spreadsheet::from(meta))
    }

    async fn worksheet(&self, spreadsheet: &Spreadsheet, title: &str) -> Result<Worksheet> {
        spreadsheet.find_worksheet(title).cloned().ok_or_else(|| {
            ResolutionError::WorksheetNotFound {
                spreadsheet: spreadsheet.title.clone(),
                worksheet: title.to_string(),
            }
            .into()
        })
    }

    async fn worksheet_values(&self, worksheet: &Worksheet) -> Result<Vec<Vec<CellValue>>> {
        let range = sheet_range(&worksheet.title);
        let mut url = endpoint(
            &self.sheets_api_url,
            &[
                "v4",
                "spreadsheets",
                worksheet.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ],
        )?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "FORMATTED_VALUE")
            .append_pair("majorDimension", "ROWS");

        let values: ValueRange = self
            .get_json(url, |status, message| {
                ResolutionError::WorksheetUnreadable {
                    spreadsheet: worksheet.spreadsheet_title.clone(),
                    worksheet: worksheet.title.clone(),
                    status,
                    message,
                }
                .into()
            })
            .await?;

        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_from_json).collect())
            .collect())
    }
}
