use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::AuthError;
use crate::oauth::{GoogleOAuthClient, StoredCredential};

/// In-memory credential store keyed by the per-browser user id.
///
/// Credentials are lost on restart and users have to sign in again.
#[derive(Default)]
pub struct CredentialStore {
    credentials: RwLock<HashMap<String, StoredCredential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, user_id: &str) -> Option<StoredCredential> {
        self.credentials.read().await.get(user_id).cloned()
    }

    pub async fn store(&self, user_id: &str, credential: StoredCredential) {
        self.credentials
            .write()
            .await
            .insert(user_id.to_string(), credential);
        debug!("Stored credential for user {}", user_id);
    }

    pub async fn delete(&self, user_id: &str) -> Option<StoredCredential> {
        self.credentials.write().await.remove(user_id)
    }

    /// Loads the credential, refreshing and re-storing it when the access token expired.
    ///
    /// Returns `Ok(None)` when the user never signed in.
    pub async fn load_fresh(
        &self,
        user_id: &str,
        oauth: &GoogleOAuthClient,
    ) -> Result<Option<StoredCredential>, AuthError> {
        let Some(credential) = self.load(user_id).await else {
            return Ok(None);
        };
        if !credential.is_expired(Utc::now()) {
            return Ok(Some(credential));
        }

        info!("Access token for user {} expired, refreshing", user_id);
        match oauth.refresh(&credential).await {
            Ok(refreshed) => {
                self.store(user_id, refreshed.clone()).await;
                Ok(Some(refreshed))
            }
            Err(err) => {
                // an unusable credential is dropped so /login starts over
                self.delete(user_id).await;
                Err(err)
            }
        }
    }
}
