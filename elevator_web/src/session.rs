//! Cookie-backed player sessions.
//!
//! The whole `SessionState` is serialized to JSON and stored in a private
//! (encrypted and authenticated) cookie, so the hidden scores can be neither
//! read nor forged by the client.

use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use elevator_rules::SessionState;
use tracing::warn;

use crate::config::{ServerConfig, MIN_SECRET_LEN};

pub const SESSION_COOKIE: &str = "elevator_session";

/// Derive the cookie key from the configured secret, or generate one.
pub fn cookie_key(config: &ServerConfig) -> Key {
    match &config.secret_key {
        Some(secret) if secret.len() >= MIN_SECRET_LEN => Key::derive_from(secret.as_bytes()),
        _ => {
            warn!("no secret key configured, sessions will not survive a restart");
            Key::generate()
        }
    }
}

/// Read the session from the jar. A missing or unreadable cookie is a
/// session that has not started.
pub fn load(jar: &PrivateCookieJar) -> SessionState {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return SessionState::default();
    };

    match serde_json::from_str(cookie.value()) {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "discarding unreadable session cookie");
            SessionState::default()
        }
    }
}

/// Write the session into the jar.
pub fn store(jar: PrivateCookieJar, session: &SessionState) -> Result<PrivateCookieJar, serde_json::Error> {
    let value = serde_json::to_string(session)?;
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok(jar.add(cookie))
}
