// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tencent Cloud credential resolution
//!
//! Credentials come from, in order:
//! 1. `TENCENTCLOUD_SECRET_ID` / `TENCENTCLOUD_SECRET_KEY`
//! 2. the TKE OIDC role, when all `TKE_*` variables are present
//! 3. the provider chain: credentials profile file, then the CVM instance role

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::constants::{sts, CVM_METADATA_ENDPOINT};
use crate::error::{Result, TendoError};
use crate::tencent::client::parse_response;
use crate::tencent::signer::CONTENT_TYPE;

/// Environment variable lookup, injectable for tests
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// API key pair, with a session token for temporary credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl Credential {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn credential(&self) -> Result<Credential>;
}

/// Reads the `TENCENTCLOUD_*` environment variables
pub struct EnvProvider {
    env: EnvLookup,
}

impl EnvProvider {
    pub fn new(env: EnvLookup) -> Self {
        Self { env }
    }
}

#[async_trait]
impl CredentialProvider for EnvProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    async fn credential(&self) -> Result<Credential> {
        let var = |key: &str| (self.env)(key).filter(|v| !v.is_empty());

        match (var("TENCENTCLOUD_SECRET_ID"), var("TENCENTCLOUD_SECRET_KEY")) {
            (Some(id), Some(key)) => {
                let credential = Credential::new(id, key);
                Ok(match var("TENCENTCLOUD_SESSION_TOKEN") {
                    Some(token) => credential.with_token(token),
                    None => credential,
                })
            }
            _ => Err(TendoError::Credentials(
                "TENCENTCLOUD_SECRET_ID and TENCENTCLOUD_SECRET_KEY are not set".to_string(),
            )),
        }
    }
}

/// Exchanges the TKE service account token for a role session
pub struct TkeOidcProvider {
    http: reqwest::Client,
    endpoint: String,
    region: String,
    provider_id: String,
    token_file: PathBuf,
    role_arn: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleWithWebIdentityRequest<'a> {
    provider_id: &'a str,
    web_identity_token: &'a str,
    role_arn: &'a str,
    role_session_name: &'a str,
    duration_seconds: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleWithWebIdentityResponse {
    credentials: TemporaryCredentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TemporaryCredentials {
    token: String,
    tmp_secret_id: String,
    tmp_secret_key: String,
}

impl TkeOidcProvider {
    /// Configured from `TKE_*` variables; `None` unless all four are set
    pub fn from_env(env: &EnvLookup, http: reqwest::Client) -> Option<Self> {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        Some(Self {
            http,
            endpoint: sts::ENDPOINT.to_string(),
            region: var("TKE_REGION")?,
            provider_id: var("TKE_PROVIDER_ID")?,
            token_file: PathBuf::from(var("TKE_WEB_IDENTITY_TOKEN_FILE")?),
            role_arn: var("TKE_ROLE_ARN")?,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CredentialProvider for TkeOidcProvider {
    fn name(&self) -> &'static str {
        "tke-oidc"
    }

    #[instrument(skip(self), fields(role = %self.role_arn))]
    async fn credential(&self) -> Result<Credential> {
        let token = tokio::fs::read_to_string(&self.token_file).await?;
        let request = AssumeRoleWithWebIdentityRequest {
            provider_id: &self.provider_id,
            web_identity_token: token.trim(),
            role_arn: &self.role_arn,
            role_session_name: sts::SESSION_NAME,
            duration_seconds: sts::DURATION_SECS,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header(reqwest::header::AUTHORIZATION, "SKIP")
            .header("X-TC-Action", "AssumeRoleWithWebIdentity")
            .header("X-TC-Version", sts::VERSION)
            .header("X-TC-Region", &self.region)
            .header("X-TC-Timestamp", Utc::now().timestamp().to_string())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let assumed: AssumeRoleWithWebIdentityResponse =
            parse_response("AssumeRoleWithWebIdentity", status, &body)?;

        debug!("Assumed role through TKE OIDC provider");
        let creds = assumed.credentials;
        Ok(Credential::new(creds.tmp_secret_id, creds.tmp_secret_key).with_token(creds.token))
    }
}

/// Reads the `[default]` profile of the Tencent Cloud credentials file
pub struct ProfileProvider {
    path: Option<PathBuf>,
}

impl ProfileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// `TENCENTCLOUD_CREDENTIALS_FILE`, or `~/.tencentcloud/credentials`
    pub fn from_env(env: &EnvLookup) -> Self {
        let path = env("TENCENTCLOUD_CREDENTIALS_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env("HOME").map(|home| PathBuf::from(home).join(".tencentcloud/credentials"))
            });

        Self { path }
    }
}

#[async_trait]
impl CredentialProvider for ProfileProvider {
    fn name(&self) -> &'static str {
        "profile"
    }

    async fn credential(&self) -> Result<Credential> {
        let Some(path) = self.path.as_ref() else {
            return Err(TendoError::Credentials(
                "no credentials file location".to_string(),
            ));
        };

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            TendoError::Credentials(format!("unable to read {}: {}", path.display(), e))
        })?;

        parse_profile(&contents, "default").ok_or_else(|| {
            TendoError::Credentials(format!(
                "{} has no secret_id/secret_key in profile default",
                path.display()
            ))
        })
    }
}

/// Extract `secret_id` / `secret_key` from an INI section
fn parse_profile(contents: &str, profile: &str) -> Option<Credential> {
    let mut in_profile = false;
    let mut secret_id = None;
    let mut secret_key = None;

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }

        if !in_profile {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                "secret_id" => secret_id = Some(value.trim().to_string()),
                "secret_key" => secret_key = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    match (secret_id, secret_key) {
        (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => {
            Some(Credential::new(id, key))
        }
        _ => None,
    }
}

/// Temporary credentials of the role bound to the CVM instance
pub struct CvmRoleProvider {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RoleCredentials {
    tmp_secret_id: String,
    tmp_secret_key: String,
    token: String,
    #[serde(default)]
    code: Option<String>,
}

impl CvmRoleProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: CVM_METADATA_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn get(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CredentialProvider for CvmRoleProvider {
    fn name(&self) -> &'static str {
        "cvm-role"
    }

    async fn credential(&self) -> Result<Credential> {
        let role = self.get(&self.endpoint).await?;
        let role = role.trim();
        if role.is_empty() {
            return Err(TendoError::Credentials(
                "no role bound to this instance".to_string(),
            ));
        }

        let body = self.get(&format!("{}{}", self.endpoint, role)).await?;
        let creds: RoleCredentials = serde_json::from_str(&body)
            .map_err(|e| TendoError::InvalidResponse(format!("role credentials: {}", e)))?;

        if let Some(code) = creds.code.as_deref().filter(|c| *c != "Success") {
            return Err(TendoError::Credentials(format!(
                "metadata service returned {} for role {}",
                code, role
            )));
        }

        Ok(Credential::new(creds.tmp_secret_id, creds.tmp_secret_key).with_token(creds.token))
    }
}

/// Tries each provider in turn, first success wins
pub struct ProviderChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl CredentialProvider for ProviderChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn credential(&self) -> Result<Credential> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.credential().await {
                Ok(credential) => {
                    debug!("Using credentials from {} provider", provider.name());
                    return Ok(credential);
                }
                Err(e) => failures.push(format!("{}: {}", provider.name(), e)),
            }
        }

        Err(TendoError::Credentials(failures.join("; ")))
    }
}

/// Resolve credentials for the Tencent Cloud API
#[instrument(skip_all)]
pub async fn resolve_credentials(http: &reqwest::Client, env: &EnvLookup) -> Result<Credential> {
    if let Ok(credential) = EnvProvider::new(env.clone()).credential().await {
        return Ok(credential);
    }

    if let Some(provider) = TkeOidcProvider::from_env(env, http.clone()) {
        match provider.credential().await {
            Ok(credential) => {
                info!("Using TKE OIDC role credentials");
                return Ok(credential);
            }
            Err(e) => warn!("TKE OIDC role credentials unavailable: {}", e),
        }
    }

    let providers: Vec<Box<dyn CredentialProvider>> = vec![
        Box::new(ProfileProvider::from_env(env)),
        Box::new(CvmRoleProvider::new(http.clone())),
    ];

    ProviderChain::new(providers).credential().await
}
