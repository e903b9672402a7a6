//! Thin REST client for `activity:query` of the Drive Activity API v2.

use gactivity_common::HTTP_CLIENT;
use reqwest::{header, Client};
use tracing::debug;

use crate::logic::DriveError;
use crate::models::{DriveActivity, QueryDriveActivityRequest, QueryDriveActivityResponse};

#[derive(Clone)]
pub struct DriveActivityClient {
    client: Client,
    base_url: String,
}

impl DriveActivityClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(HTTP_CLIENT.clone(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches a single page.
    pub async fn query_page(
        &self,
        access_token: &str,
        request: &QueryDriveActivityRequest,
    ) -> Result<QueryDriveActivityResponse, DriveError> {
        let url = format!("{}/activity:query", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<QueryDriveActivityResponse>().await?)
    }

    /// Follows `nextPageToken` until the last page and returns every activity.
    pub async fn query_all(
        &self,
        access_token: &str,
        mut request: QueryDriveActivityRequest,
    ) -> Result<Vec<DriveActivity>, DriveError> {
        let mut activities = Vec::new();
        loop {
            let page = self.query_page(access_token, &request).await?;
            debug!("Drive activity page with {} entries", page.activities.len());
            activities.extend(page.activities);

            match page.next_page_token {
                Some(token) if !token.is_empty() => request.page_token = Some(token),
                _ => break,
            }
        }
        Ok(activities)
    }
}
