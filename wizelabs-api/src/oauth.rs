/// Identity provider client (OAuth2 authorization-code flow)
///
/// 1. `/auth/login` sends the browser to [`OAuthClient::authorize_url`] with a
///    random `state` that is also stored in a cookie.
/// 2. The provider redirects back to `/auth/callback?code&state`.
/// 3. [`OAuthClient::exchange_code`] trades the code for a provider token.
/// 4. [`OAuthClient::user_info`] reads the verified identity.

use rand::RngCore;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use wizelabs_shared::auth::login::VerifiedIdentity;

use crate::config::OAuthConfig;

const SCOPES: &str = "openid profile email";

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The provider answered but refused (bad code, expired grant)
    #[error("Identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("Email address is not verified")]
    UnverifiedEmail,

    #[error("Identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid identity provider URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderToken {
    pub access_token: String,

    #[serde(default)]
    pub id_token: Option<String>,

    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// `/userinfo` response (OIDC standard claims)
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub email: String,

    #[serde(default)]
    pub email_verified: Option<bool>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub given_name: Option<String>,

    #[serde(default)]
    pub family_name: Option<String>,

    #[serde(default)]
    pub picture: Option<String>,
}

impl UserInfo {
    /// Rejects identities whose provider says the email is unverified
    pub fn into_identity(self) -> Result<VerifiedIdentity, OAuthError> {
        if self.email_verified == Some(false) {
            return Err(OAuthError::UnverifiedEmail);
        }

        Ok(VerifiedIdentity {
            email: self.email,
            name: self.name,
            given_name: self.given_name,
            family_name: self.family_name,
            picture: self.picture,
        })
    }
}

#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

/// 16 random bytes, hex encoded
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("wizelabs-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.issuer.trim_end_matches('/'), path)
    }

    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            &self.endpoint("/authorize"),
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::InvalidUrl(e.to_string()))?;

        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<ProviderToken, OAuthError> {
        let response = self
            .http
            .post(self.endpoint("/oauth/token"))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Code exchange rejected");
            return Err(OAuthError::Rejected(format!("token endpoint returned {}", status)));
        }

        Ok(response.json().await?)
    }

    pub async fn user_info(&self, access_token: &str) -> Result<VerifiedIdentity, OAuthError> {
        let response = self
            .http
            .get(self.endpoint("/userinfo"))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::Rejected(format!("userinfo endpoint returned {}", status)));
        }

        response.json::<UserInfo>().await?.into_identity()
    }
}
