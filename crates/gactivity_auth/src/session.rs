//! Server-side browser sessions.
//!
//! The browser only holds a signed session id (`<id>.<hex hmac>`); everything
//! else lives in the [`SessionStore`].

use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use http::{header, HeaderMap};
use sha2::Sha256;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// State kept for one browser between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    /// Key of the user's credential in the [`crate::CredentialStore`].
    pub user_id: Option<String>,
    pub google_account_id: Option<String>,
    pub google_account_email: Option<String>,
    /// CSRF state sent with the consent redirect.
    pub oauth_state: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session ids with HMAC-SHA256.
#[derive(Clone)]
pub struct CookieSigner {
    key: Vec<u8>,
}

impl CookieSigner {
    /// An empty secret yields a random key, which invalidates cookies on restart.
    pub fn new(secret: &str) -> Self {
        let key = if secret.is_empty() {
            tracing::warn!("session.secret is empty, using a random signing key");
            format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()).into_bytes()
        } else {
            secret.as_bytes().to_vec()
        };
        Self { key }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }

    pub fn sign(&self, value: &str) -> String {
        let mut mac = self.mac();
        mac.update(value.as_bytes());
        format!("{}.{}", value, hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the original value when the signature matches.
    pub fn verify(&self, signed: &str) -> Option<String> {
        let (value, signature) = signed.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac();
        mac.update(value.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(value.to_string())
    }
}

/// Session store plus the cookie settings used to address it.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    signer: CookieSigner,
    cookie_name: String,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionStore {
    pub fn new(signer: CookieSigner, cookie_name: &str, ttl_minutes: i64, secure_cookie: bool) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            signer,
            cookie_name: cookie_name.to_string(),
            ttl: Duration::minutes(ttl_minutes.max(1)),
            secure_cookie,
        }
    }

    pub async fn create(&self) -> Session {
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            user_id: None,
            google_account_id: None,
            google_account_email: None,
            oauth_state: None,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        debug!("Created session {}", session.id);
        session
    }

    /// Returns a live session; expired ones are dropped on access.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(id) {
            Some(session) if session.expires_at > Utc::now() => Some(session.clone()),
            Some(_) => {
                sessions.remove(id);
                None
            }
            None => None,
        }
    }

    /// Saves the session and extends its lifetime.
    pub async fn update(&self, mut session: Session) -> Session {
        session.expires_at = Utc::now() + self.ttl;
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        session
    }

/// Moves the session's data to a fresh id and drops the old one.
    ///
    /// Called once sign-in completes so a cookie issued before the sign-in
    /// never addresses the signed-in session. The pending OAuth state is cleared.
    pub async fn rotate(&self, session: Session) -> Session {
        let rotated = Session {
            id: Uuid::new_v4().simple().to_string(),
            oauth_state: None,
            expires_at: Utc::now() + self.ttl,
            ..session.clone()
        };
        let mut sessions = self.sessions.write().await;
        sessions.remove(&session.id);
        sessions.insert(rotated.id.clone(), rotated.clone());
        debug!("Rotated session {} to {}", session.id, rotated.id);
        rotated
    }

    pub async fn invalidate(&self, id: &str) {
        self.sessions.write().await.remove(id);
        debug!("Invalidated session {}", id);
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    /// Finds the session addressed by the request's signed cookie.
    pub async fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let id = self.session_id_from_headers(headers)?;
        self.get(&id).await
    }

    pub fn session_id_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| Cookie::split_parse(raw.to_string()))
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.cookie_name)
            .and_then(|cookie| self.signer.verify(cookie.value()))
    }

    /// `Set-Cookie` value carrying the signed session id.
    pub fn session_cookie(&self, session: &Session) -> String {
        Cookie::build((self.cookie_name.clone(), self.signer.sign(&session.id)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()))
            .build()
            .to_string()
    }

    /// `Set-Cookie` value that clears the session cookie.
    pub fn removal_cookie(&self) -> String {
        let mut cookie = Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .build();
        cookie.make_removal();
        cookie.to_string()
    }
}

#[cfg(test)]
impl SessionStore {
    pub(crate) async fn sessions_for_test(
        &self,
    ) -> tokio::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().await
    }
}
