// src/integrations/catalog/client.rs
//
// Remote Catalog Service access.
//
// This is INFRASTRUCTURE, not DOMAIN: the client fetches remote records
// and maps failures into the local error taxonomy; it never mutates the
// cache or manifest itself. All engine code depends on the trait so the
// remote can be mocked out in tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use crate::domain::{CatalogProfile, ModEvent, ModProfile, Modfile, UserProfile};
use crate::error::{AppError, AppResult};

/// One page of a limit/offset query.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub result_count: u64,
    pub result_limit: u64,
    pub result_offset: u64,
}

impl<T> Page<T> {
    /// Build a page from in-memory data, deriving `result_count`. Handy
    /// for tests and stub remotes.
    pub fn of(data: Vec<T>, result_offset: u64, result_limit: u64) -> Self {
        Self {
            result_count: data.len() as u64,
            data,
            result_limit,
            result_offset,
        }
    }
}

/// Operations the remote catalog must expose.
///
/// Authenticated calls take the session token explicitly; a 401/403
/// response surfaces as `AppError::Auth` and the caller invalidates the
/// local session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn get_catalog_profile(&self) -> AppResult<CatalogProfile>;

    async fn list_mods(&self, offset: u64, limit: u64) -> AppResult<Page<ModProfile>>;

    async fn list_events(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Page<ModEvent>>;

    async fn list_subscriptions(
        &self,
        token: &str,
        offset: u64,
        limit: u64,
    ) -> AppResult<Page<ModProfile>>;

    async fn get_mod(&self, mod_id: u64) -> AppResult<ModProfile>;

    async fn get_modfile(&self, mod_id: u64, modfile_id: u64) -> AppResult<Modfile>;

    async fn get_authenticated_user(&self, token: &str) -> AppResult<UserProfile>;

    async fn subscribe(&self, token: &str, mod_id: u64) -> AppResult<()>;

    async fn unsubscribe(&self, token: &str, mod_id: u64) -> AppResult<()>;
}

/// HTTP implementation over the catalog's REST surface.
pub struct HttpCatalogClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(AppError::Network)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)], token: Option<&str>) -> AppResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut request = self
            .http
            .get(self.url(path))
            .header(header::ACCEPT, "application/json")
            .query(&[("api_key", self.api_key.as_str())])
            .query(query);

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let response = Self::check_status(response)?;
        Ok(response.json().await?)
    }

    fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AppError::Auth(response.status().as_u16()))
            }
            status if !status.is_success() => Err(AppError::Other(format!(
                "catalog returned status {} for {}",
                status,
                response.url()
            ))),
            _ => Ok(response),
        }
    }

    fn page_query(offset: u64, limit: u64) -> Vec<(&'static str, String)> {
        vec![("_offset", offset.to_string()), ("_limit", limit.to_string())]
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_catalog_profile(&self) -> AppResult<CatalogProfile> {
        self.get_json("", &[], None).await
    }

    async fn list_mods(&self, offset: u64, limit: u64) -> AppResult<Page<ModProfile>> {
        self.get_json("/mods", &Self::page_query(offset, limit), None)
            .await
    }

    async fn list_events(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Page<ModEvent>> {
        let mut query = Self::page_query(offset, limit);
        // Half-open range [from, until)
        query.push(("date_added-min", from.timestamp().to_string()));
        query.push(("date_added-max", (until.timestamp() - 1).to_string()));
        query.push(("latest", "true".to_string()));
        self.get_json("/mods/events", &query, None).await
    }

    async fn list_subscriptions(
        &self,
        token: &str,
        offset: u64,
        limit: u64,
    ) -> AppResult<Page<ModProfile>> {
        self.get_json("/me/subscribed", &Self::page_query(offset, limit), Some(token))
            .await
    }

    async fn get_mod(&self, mod_id: u64) -> AppResult<ModProfile> {
        self.get_json(&format!("/mods/{}", mod_id), &[], None).await
    }

    async fn get_modfile(&self, mod_id: u64, modfile_id: u64) -> AppResult<Modfile> {
        self.get_json(&format!("/mods/{}/files/{}", mod_id, modfile_id), &[], None)
            .await
    }

    async fn get_authenticated_user(&self, token: &str) -> AppResult<UserProfile> {
        self.get_json("/me", &[], Some(token)).await
    }

    async fn subscribe(&self, token: &str, mod_id: u64) -> AppResult<()> {
        let response = self
            .http
            .post(self.url(&format!("/mods/{}/subscribe", mod_id)))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;
        Self::check_status(response)?;
        Ok(())
    }

    async fn unsubscribe(&self, token: &str, mod_id: u64) -> AppResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/mods/{}/subscribe", mod_id)))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;
        Self::check_status(response)?;
        Ok(())
    }
}
