//! Session layer configuration.
//!
//! Cookies are signed with `SESSION_SECRET`; session data lives in the store
//! (`PostgreSQL` in production, in-memory in tests).

use secrecy::{ExposeSecret, SecretString};
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopfront_session";

/// Sessions expire after 7 days without a request.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Derive the cookie signing key from the configured secret.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the secret is too short to sign with.
pub fn signing_key(secret: &SecretString) -> Result<Key, ConfigError> {
    Key::try_from(secret.expose_secret().as_bytes())
        .map_err(|e| ConfigError::InsecureSecret("SESSION_SECRET".to_owned(), e.to_string()))
}

/// Create the session layer over any session store.
///
/// # Errors
///
/// Returns `ConfigError` if the signing key cannot be derived.
pub fn create_session_layer<S>(
    store: S,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, ConfigError>
where
    S: SessionStore + Clone,
{
    let key = signing_key(&config.session_secret)?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_cannot_sign() {
        let secret = SecretString::from("too-short");
        assert!(matches!(
            signing_key(&secret),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_64_byte_secret_signs() {
        let secret = SecretString::from("k".repeat(64));
        assert!(signing_key(&secret).is_ok());
    }
}
