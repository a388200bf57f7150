use crate::adapters::google::api;
use crate::utils::error::{CredentialError, FetchError, Result};
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Drive is needed to look a spreadsheet up by title.
pub const READ_ONLY_SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets.readonly https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A parsed service account together with its decoded signing key.
pub struct ServiceAccountKey {
    account: ServiceAccount,
    key_pair: RsaKeyPair,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Reads and decodes the key file. No network access happens here.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CredentialError::Unreadable {
                path: path.display().to_string(),
                source,
            })?;
        let account: ServiceAccount =
            serde_json::from_str(&content).map_err(|source| CredentialError::Malformed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_account(account)
    }

    pub fn from_account(account: ServiceAccount) -> Result<Self> {
        let key_pair = decode_private_key(&account.private_key)?;
        Ok(Self { account, key_pair })
    }

    pub fn account(&self) -> &ServiceAccount {
        &self.account
    }

    /// Builds the signed RS256 assertion sent to the token endpoint.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.account.private_key_id.as_deref(),
        };
        let claims = JwtClaims {
            iss: &self.account.client_email,
            scope: READ_ONLY_SCOPES,
            aud: &self.account.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let header_b64 =
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(FetchError::Serialization)?);
        let claims_b64 =
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(FetchError::Serialization)?);
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        // PKCS#1 v1.5 SHA-256 (RS256)
        let mut signature = vec![0; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| CredentialError::InvalidKey {
                reason: "failed to sign token assertion".to_string(),
            })?;

        Ok(format!(
            "{}.{}",
            signing_input,
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    /// Exchanges a fresh assertion for an OAuth access token.
    pub async fn fetch_access_token(&self, client: &Client) -> Result<AccessToken> {
        let jwt = self.assertion(Utc::now())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", jwt.as_str())];

        tracing::debug!("Requesting access token from {}", self.account.token_uri);
        let response = client
            .post(&self.account.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(if status.is_client_error() {
                CredentialError::Rejected {
                    status: status.as_u16(),
                    message: api::error_message(&body),
                }
                .into()
            } else {
                FetchError::Service {
                    status: status.as_u16(),
                    message: api::error_message(&body),
                }
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Service {
            status: status.as_u16(),
            message: format!("unexpected token response: {}", e),
        })
    }
}

fn decode_private_key(pem: &str) -> Result<RsaKeyPair> {
    let mut reader = std::io::Cursor::new(pem.as_bytes());
    let item = rustls_pemfile::read_one(&mut reader).map_err(|e| CredentialError::InvalidKey {
        reason: format!("invalid PEM private key: {}", e),
    })?;

    let key_pair = match item {
        Some(rustls_pemfile::Item::Pkcs8Key(der)) => RsaKeyPair::from_pkcs8(der.secret_pkcs8_der())
            .map_err(|e| CredentialError::InvalidKey {
                reason: format!("rejected pkcs8 key: {}", e),
            })?,
        Some(rustls_pemfile::Item::Pkcs1Key(der)) => RsaKeyPair::from_der(der.secret_pkcs1_der())
            .map_err(|e| CredentialError::InvalidKey {
                reason: format!("rejected pkcs1 key: {}", e),
            })?,
        _ => {
            return Err(CredentialError::InvalidKey {
                reason: "no RSA private key found in PEM data".to_string(),
            }
            .into())
        }
    };

    Ok(key_pair)
}
