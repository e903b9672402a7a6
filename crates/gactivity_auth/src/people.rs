//! People API lookups: the signed-in profile and `people/{id}` to email resolution.

use async_trait::async_trait;
use gactivity_common::HTTP_CLIENT;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AuthError;

const PERSON_FIELDS: &str = "emailAddresses,names";

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Person {
    resource_name: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    names: Vec<Name>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Name {
    display_name: Option<String>,
}

/// Profile of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    /// Resource name without the `people/` prefix.
    pub account_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Clone)]
pub struct PeopleClient {
    client: Client,
    base_url: String,
}

impl PeopleClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(HTTP_CLIENT.clone(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_person(&self, access_token: &str, resource_name: &str) -> Result<Person, AuthError> {
        let url = format!("{}/{}", self.base_url, resource_name);
        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .query(&[("personFields", PERSON_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<Person>().await?)
    }

    /// Reads `people/me` for the token's owner.
    pub async fn me(&self, access_token: &str) -> Result<GoogleProfile, AuthError> {
        let person = self.get_person(access_token, "people/me").await?;

        let resource_name = person
            .resource_name
            .ok_or_else(|| AuthError::ProfileError("profile has no resource name".to_string()))?;
        let email = person
            .email_addresses
            .into_iter()
            .find_map(|address| address.value)
            .ok_or_else(|| AuthError::ProfileError("profile has no email address".to_string()))?;
        let display_name = person.names.into_iter().find_map(|name| name.display_name);

        Ok(GoogleProfile {
            account_id: resource_name.trim_start_matches("people/").to_string(),
            email,
            display_name,
        })
    }

    /// First email address of a person, if the caller may see one.
    pub async fn email_address(
        &self,
        access_token: &str,
        resource_name: &str,
    ) -> Result<Option<String>, AuthError> {
        let person = self.get_person(access_token, resource_name).await?;
        Ok(person
            .email_addresses
            .into_iter()
            .find_map(|address| address.value))
    }
}

/// Resolves `people/{id}` names found in Drive activity to email addresses.
#[async_trait]
pub trait EmailLookup: Send + Sync {
    /// Never fails: unresolvable names come back unchanged.
    async fn resolve(&self, access_token: &str, person_name: &str) -> String;
}

/// `true` for names of the form `people/{id}`.
pub fn is_person_resource(name: &str) -> bool {
    name.strip_prefix("people/")
        .map(|id| !id.is_empty() && !id.contains('/'))
        .unwrap_or(false)
}

/// [`EmailLookup`] backed by the People API.
///
/// Holds no state: answers depend on the caller's token, so callers keep
/// their own per-collection map.
pub struct EmailResolver {
    people: PeopleClient,
}

impl EmailResolver {
    pub fn new(people: PeopleClient) -> Self {
        Self { people }
    }
}

#[async_trait]
impl EmailLookup for EmailResolver {
    async fn resolve(&self, access_token: &str, person_name: &str) -> String {
        if !is_person_resource(person_name) {
            return person_name.to_string();
        }

        match self.people.email_address(access_token, person_name).await {
            Ok(Some(email)) => {
                debug!("Resolved {} to {}", person_name, email);
                email
            }
            Ok(None) => person_name.to_string(),
            Err(err) => {
                warn!("People lookup for {} failed: {}", person_name, err);
                person_name.to_string()
            }
        }
    }
}
