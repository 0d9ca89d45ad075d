// loyalty-client/src/http.rs
// HTTP 客户端 - 与会员积分后端通信

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::client::{ForgotPasswordRequest, SignInRequest};

use crate::config::ClientConfig;
use crate::credential::{Credential, CredentialStorage, MemoryTokenStore, TokenStore};
use crate::{ClientError, ClientResult};

/// 网络 HTTP 客户端
///
/// Every request reads the bearer token from the [`TokenStore`] at send time,
/// so a sign-in on one handle is visible to all clones.
#[derive(Debug, Clone)]
pub struct LoyaltyHttpClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn TokenStore>,
}

impl LoyaltyHttpClient {
    pub fn new(config: &ClientConfig, credentials: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            ClientError::Config(format!("invalid base url {:?}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base url {:?} cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Build a client whose credential store follows the configuration
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let store: Arc<dyn TokenStore> = match &config.credential_path {
            Some(path) => Arc::new(CredentialStorage::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::new(config, store)
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn TokenStore> {
        &self.credentials
    }

    pub fn is_signed_in(&self) -> bool {
        self.credentials
            .load()
            .is_some_and(|credential| !credential.is_expired())
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Join path segments onto the base URL, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        let response = self.authorize(self.client.get(url)).send().await?;
        let body = self.read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST returning the raw body, for endpoints whose reply shape varies
    pub(crate) async fn post_raw<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<String> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST");
        let response = self.authorize(self.client.post(url).json(body)).send().await?;
        self.read_body(response).await
    }

    async fn read_body(&self, response: reqwest::Response) -> ClientResult<String> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                // 401: 凭证失效，清除本地 token
                if let Err(e) = self.credentials.clear() {
                    tracing::warn!(error = %e, "Failed to clear rejected credential");
                }
                tracing::info!("Credential rejected by server, signed out");
                Err(ClientError::Unauthorized)
            }
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
            StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
            _ => Err(ClientError::Internal(format!("{}: {}", status, text))),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Sign the cashier in and store the issued token
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Credential> {
        let req = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let body = self
            .post_raw(&["users", "cashier", "signin"], &req)
            .await
            .map_err(|e| match e {
                // signin 的 401 表示账号密码错误
                ClientError::Unauthorized => ClientError::InvalidCredentials,
                other => other,
            })?;

        let token = extract_token(&body)
            .ok_or_else(|| ClientError::InvalidResponse("sign-in reply carries no token".into()))?;
        let credential = Credential::new(token, Some(email.to_string()));
        self.credentials.save(&credential)?;
        tracing::info!(email = %email, "Cashier signed in");
        Ok(credential)
    }

    /// Ask the backend to mail a password reset link
    pub async fn forgot_password(&self, email: &str) -> ClientResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ClientError::Validation("email is required".into()));
        }
        let req = ForgotPasswordRequest {
            email: email.to_string(),
        };
        // 回复内容无意义，2xx 即视为已发送
        self.post_raw(&["users", "forgotPassword"], &req).await?;
        tracing::info!(email = %email, "Password reset requested");
        Ok(())
    }

    /// Drop the stored credential
    pub fn sign_out(&self) -> ClientResult<()> {
        self.credentials.clear()?;
        tracing::info!("Cashier signed out");
        Ok(())
    }
}

/// The sign-in reply is the bare token: a JSON string, plain text, or `{ "token": ... }`
fn extract_token(body: &str) -> Option<String> {
    let body = body.trim();
    let token = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(token)) => token,
        Ok(serde_json::Value::Object(map)) => map.get("token")?.as_str()?.to_string(),
        Ok(_) => return None,
        Err(_) => body.to_string(),
    };
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> LoyaltyHttpClient {
        LoyaltyHttpClient::new(&ClientConfig::new(base), Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://pos.local:8080");
        assert_eq!(
            c.endpoint(&["restaurant", "7", "12"]).unwrap().as_str(),
            "http://pos.local:8080/restaurant/7/12"
        );

        let c = client("http://pos.local/api/");
        assert_eq!(
            c.endpoint(&["membership", "12"]).unwrap().as_str(),
            "http://pos.local/api/membership/12"
        );
    }

    #[test]
    fn test_endpoint_encodes_scanned_code() {
        let c = client("http://pos.local");
        assert_eq!(
            c.endpoint(&["restaurantByCode", "A B/1"]).unwrap().as_str(),
            "http://pos.local/restaurantByCode/A%20B%2F1"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = LoyaltyHttpClient::new(
            &ClientConfig::new("not a url"),
            Arc::new(MemoryTokenStore::new()),
        );
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token("\"abc\"").as_deref(), Some("abc"));
        assert_eq!(extract_token("abc.def.ghi").as_deref(), Some("abc.def.ghi"));
        assert_eq!(extract_token(r#"{"token":"xyz"}"#).as_deref(), Some("xyz"));
        assert_eq!(extract_token("   "), None);
        assert_eq!(extract_token("42"), None);
    }

    #[test]
    fn test_sign_out_clears_store() {
        let store = Arc::new(MemoryTokenStore::with_token("t"));
        let c = LoyaltyHttpClient::new(&ClientConfig::default(), store.clone()).unwrap();
        assert!(c.is_signed_in());
        c.sign_out().unwrap();
        assert!(store.load().is_none());
        assert!(!c.is_signed_in());
    }
}
