// loyalty-client/src/credential.rs
// 凭证存储 - 收银员 token，支持 JSON 文件存储

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 凭证结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token issued by the cashier sign-in
    pub token: String,
    pub email: Option<String>,
    /// JWT `exp` claim, when the token carries one
    pub expires_at: Option<u64>,
}

impl Credential {
    pub fn new(token: impl Into<String>, email: Option<String>) -> Self {
        let token = token.into();
        let expires_at = parse_jwt_exp(&token);
        Self {
            token,
            email,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            return now > expires_at;
        }
        false
    }
}

/// 从 JWT token 中解析过期时间 (Unix timestamp)
fn parse_jwt_exp(token: &str) -> Option<u64> {
    // JWT 格式: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;
    payload.get("exp")?.as_u64()
}

/// Where the auth collaborator keeps the cashier credential.
///
/// Every request reads the token through this trait; a 401 reply clears it.
pub trait TokenStore: Send + Sync + fmt::Debug {
    fn load(&self) -> Option<Credential>;
    fn save(&self, credential: &Credential) -> Result<(), CredentialError>;
    fn clear(&self) -> Result<(), CredentialError>;

    fn token(&self) -> Option<String> {
        self.load().map(|c| c.token)
    }
}

/// 凭证存储 (JSON 文件)
#[derive(Debug, Clone)]
pub struct CredentialStorage {
    path: PathBuf,
}

impl CredentialStorage {
    /// 创建凭证存储
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 确保目录存在
    fn ensure_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 检查凭证是否存在
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl TokenStore for CredentialStorage {
    fn load(&self) -> Option<Credential> {
        if !self.path.exists() {
            return None;
        }
        let json = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&json) {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable credential file"
                );
                None
            }
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store, for tests and for terminals without a work directory
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(Credential::new(token, None))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<Credential> {
        self.inner.read().clone()
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        *self.inner.write() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.inner.write() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    fn jwt_with_exp(exp: u64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"cashier","exp":{}}}"#, exp));
        format!("{}.{}.sig", header, payload)
    }

    #[test]
    fn test_jwt_exp_is_parsed() {
        let credential = Credential::new(jwt_with_exp(1_000), None);
        assert_eq!(credential.expires_at, Some(1_000));
        assert!(credential.is_expired());
    }

    #[test]
    fn test_opaque_token_never_expires() {
        let credential = Credential::new("opaque-token", Some("a@b.c".into()));
        assert_eq!(credential.expires_at, None);
        assert!(!credential.is_expired());
    }

    #[test]
    fn test_future_exp_is_valid() {
        let future = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        assert!(!Credential::new(jwt_with_exp(future), None).is_expired());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert!(store.token().is_none());

        store.save(&Credential::new("t-1", None)).unwrap();
        assert_eq!(store.token().as_deref(), Some("t-1"));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}
