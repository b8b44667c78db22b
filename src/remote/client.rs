//! esa.io HTTP client
//!
//! Async client for the post endpoints of the esa.io v1 API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::types::*;
use crate::config::{Credentials, EsaConfig};
use crate::core::article::{Article, DiaryEntry};
use crate::core::store::ArticleStore;
use crate::error::RequestError;

/// HTTP client for one esa.io team
#[derive(Clone)]
pub struct EsaClient {
    client: Client,
    base_url: Url,
    team: String,
    token: String,
}

impl std::fmt::Debug for EsaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsaClient")
            .field("base_url", &self.base_url.as_str())
            .field("team", &self.team)
            .finish_non_exhaustive()
    }
}

impl EsaClient {
    /// Create new client from config and validated credentials
    pub fn from_config(config: &EsaConfig, credentials: &Credentials) -> Result<Self> {
        Self::new(
            &config.base_url,
            &credentials.team,
            &credentials.token,
            config.timeout_secs,
        )
    }

    /// Create new client with explicit parameters
    pub fn new(base_url: &str, team: &str, token: &str, timeout_secs: u64) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid esa base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("esa base URL must be http(s): {}", base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            team: team.to_string(),
            token: token.to_string(),
        })
    }

    /// `/v1/teams/{team}/posts`, optionally followed by `/{number}`
    fn posts_url(&self, number: Option<u64>) -> Url {
        let mut url = self.base_url.clone();
        // checked in new(): the base URL always has path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "teams", self.team.as_str(), "posts"]);
            if let Some(number) = number {
                segments.push(&number.to_string());
            }
        }
        url
    }

    /// Add auth and accept headers
    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    // ============== Helpers ==============

    /// Turn a non-2xx response into `RequestError::Rejected`
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, RequestError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = match resp.json::<ApiErrorResponse>().await {
            Ok(err) => err.message.unwrap_or(err.error),
            Err(_) => "Unknown error".to_string(),
        };
        Err(RequestError::Rejected { status, message })
    }
}

#[async_trait]
impl ArticleStore for EsaClient {
    async fn lookup(&self, full_name: &str) -> Result<Option<Article>, RequestError> {
        let url = self.posts_url(None);
        debug!(full_name, "searching post by full name");

        let resp = self
            .authorized(self.client.get(url))
            .query(&[("q", format!("full_name:{}", full_name))])
            .send()
            .await?;

        let list: PostListResponse = Self::check(resp).await?.json().await?;
        Ok(list.into_exact(full_name))
    }

    async fn append(&self, article: &Article, entry: &DiaryEntry) -> Result<(), RequestError> {
        let url = self.posts_url(Some(article.number));
        debug!(number = article.number, entry = %entry, "updating post body");

        let req = PostEnvelope {
            post: UpdatePost {
                name: article.name.clone(),
                body_md: article.body_with(entry),
                wip: true,
            },
        };

        let resp = self
            .authorized(self.client.patch(url))
            .json(&req)
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    async fn create_from_template(
        &self,
        category: &str,
        name: &str,
        template_full_name: &str,
    ) -> Result<(), RequestError> {
        let url = self.posts_url(None);
        debug!(category, name, template_full_name, "creating post from template");

        let req = PostEnvelope {
            post: CreatePost {
                name: name.to_string(),
                category: category.to_string(),
                wip: true,
                template_post_full_name: template_full_name.to_string(),
            },
        };

        let resp = self
            .authorized(self.client.post(url))
            .json(&req)
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }
}
