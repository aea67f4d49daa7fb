use argon2::password_hash::{Error as HashError, PasswordHash, PasswordVerifier};
use argon2::Argon2;
use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::AppConfig;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "chefbook_session";

/// Issues and checks the admin session cookie:
/// `base64url("<username>:<expiry unix secs>") "." base64url(hmac_sha256)`.
pub struct SessionSigner {
    key: Vec<u8>,
    ttl: Duration,
    secure: bool,
}

impl SessionSigner {
    pub fn new(secret: &[u8], ttl: Duration, secure: bool) -> Self {
        Self {
            key: secret.to_vec(),
            ttl,
            secure,
        }
    }

    fn mac(&self) -> anyhow::Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| anyhow::anyhow!("invalid session key: {e}"))
    }

    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> anyhow::Result<String> {
        let expires = (now + self.ttl).timestamp();
        let payload = URL_SAFE_NO_PAD.encode(format!("{username}:{expires}"));

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Returns the username of a valid, unexpired session token.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        let (payload, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
        let (username, expires) = decoded.rsplit_once(':')?;
        let expires: i64 = expires.parse().ok()?;
        if now.timestamp() >= expires || username.is_empty() {
            return None;
        }
        Some(username.to_string())
    }

    pub fn set_cookie(&self, token: &str) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
            self.ttl.num_seconds()
        )
    }

    pub fn clear_cookie(&self) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{secure}")
    }
}

pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Checks the submitted credentials against the configured admin account.
/// An Argon2 PHC hash takes precedence; the plaintext password is a development fallback.
pub fn verify_credentials(config: &AppConfig, username: &str, password: &str) -> anyhow::Result<bool> {
    if username != config.admin_username || password.is_empty() {
        return Ok(false);
    }

    if !config.admin_password_hash.is_empty() {
        let hash = PasswordHash::new(&config.admin_password_hash)
            .map_err(|e| anyhow::anyhow!("ADMIN_PASSWORD_HASH is not a valid PHC string: {e}"))?;
        return match Argon2::default().verify_password(password.as_bytes(), &hash) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("failed to verify password hash: {e}")),
        };
    }

    if !config.admin_password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD_HASH not set, comparing plaintext ADMIN_PASSWORD");
        return Ok(password == config.admin_password);
    }

    tracing::error!("no admin password configured, refusing login");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use axum::http::HeaderValue;

    fn signer() -> SessionSigner {
        SessionSigner::new(b"test-secret", Duration::hours(8), false)
    }

    #[test]
    fn test_issue_and_verify() {
        let now = Utc::now();
        let token = signer().issue("chef", now).unwrap();
        assert_eq!(signer().verify(&token, now), Some("chef".to_string()));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now();
        let token = signer().issue("chef", now).unwrap();
        assert_eq!(signer().verify(&token, now + Duration::hours(9)), None);
    }

    #[test]
    fn test_tampered_token() {
        let now = Utc::now();
        let token = signer().issue("chef", now).unwrap();
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("{}.{sig}", URL_SAFE_NO_PAD.encode("admin:99999999999"));
        assert_eq!(signer().verify(&forged, now), None);

        let other = SessionSigner::new(b"other-secret", Duration::hours(8), false);
        assert_eq!(other.verify(&token, now), None);
        assert_eq!(signer().verify("garbage", now), None);
    }

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; chefbook_session=abc.def; other=1"),
        );
        assert_eq!(session_token(&headers), Some("abc.def"));

        let empty = HeaderMap::new();
        assert_eq!(session_token(&empty), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = SessionSigner::new(b"k", Duration::hours(1), true).set_cookie("tok");
        assert!(cookie.starts_with("chefbook_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_verify_credentials_plaintext_and_hash() {
        let mut config = AppConfig {
            admin_username: "chef".to_string(),
            admin_password: "letmein".to_string(),
            ..Default::default()
        };
        assert!(verify_credentials(&config, "chef", "letmein").unwrap());
        assert!(!verify_credentials(&config, "chef", "wrong").unwrap());
        assert!(!verify_credentials(&config, "someone", "letmein").unwrap());

        let salt = SaltString::from_b64("c29tZXNhbHQ").unwrap();
        config.admin_password_hash = Argon2::default()
            .hash_password(b"s3cret", &salt)
            .unwrap()
            .to_string();
        assert!(verify_credentials(&config, "chef", "s3cret").unwrap());
        assert!(!verify_credentials(&config, "chef", "letmein").unwrap());
    }

    #[test]
    fn test_no_password_configured() {
        let config = AppConfig {
            admin_username: "chef".to_string(),
            ..Default::default()
        };
        assert!(!verify_credentials(&config, "chef", "anything").unwrap());
    }
}
