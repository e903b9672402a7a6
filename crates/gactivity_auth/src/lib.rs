// --- File: crates/gactivity_auth/src/lib.rs ---
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod people;
#[cfg(test)]
mod people_test;
pub mod session;

pub use credentials::CredentialStore;
pub use error::AuthError;
pub use oauth::{GoogleOAuthClient, StoredCredential, USER_SCOPES};
pub use people::{is_person_resource, EmailLookup, EmailResolver, GoogleProfile, PeopleClient};
pub use session::{CookieSigner, Session, SessionStore};
