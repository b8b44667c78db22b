//! Article store abstraction
//!
//! The reconciler only needs three calls against the remote service. Putting
//! them behind a trait lets the HTTP client and in-memory test doubles share
//! the same orchestration code.
//!
//! ```text
//! Reconciler ──> ArticleStore ──┬── EsaClient (HTTP)
//!                               └── test doubles
//! ```

use async_trait::async_trait;

use super::article::{Article, DiaryEntry};
use crate::error::RequestError;

/// Backend trait for diary article operations
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// First article whose full name is exactly `full_name`, if any.
    ///
    /// Read-only; safe to retry.
    async fn lookup(&self, full_name: &str) -> Result<Option<Article>, RequestError>;

    /// Replace the article body with `article.body_md + "\n" + entry`, flagged wip.
    ///
    /// The caller must pass the body it just read; anything written since is lost.
    async fn append(&self, article: &Article, entry: &DiaryEntry) -> Result<(), RequestError>;

    /// Create `category/name` from `template_full_name`, flagged wip.
    ///
    /// Not idempotent: two calls create two articles.
    async fn create_from_template(
        &self,
        category: &str,
        name: &str,
        template_full_name: &str,
    ) -> Result<(), RequestError>;
}

#[cfg(test)]
pub mod testing {
    //! In-memory store that mimics the service's delayed search indexing.

    use std::sync::Mutex;

    use reqwest::StatusCode;

    use super::*;

    #[derive(Debug, Default)]
    struct State {
        /// (full name, article, lookups still returning nothing)
        articles: Vec<(String, Article, u32)>,
        next_number: u64,
        lookups: u32,
        creates: u32,
        /// Set once a create has succeeded
        created: bool,
        /// Lookups after a create that still fail before the store recovers
        post_create_failures: u32,
        appends: Vec<(u64, String)>,
    }

    /// Scriptable in-memory article store
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        state: Mutex<State>,
        /// Lookups that miss after a create before the new article shows up
        index_lag: u32,
        template_body: String,
        fail_lookup: bool,
        fail_create: bool,
        fail_append: bool,
    }

    fn rejected() -> RequestError {
        RequestError::Rejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "scripted failure".to_string(),
        }
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Store with one existing, already indexed article
        pub fn with_article(full_name: &str, body: &str) -> Self {
            let store = Self::new();
            {
                let mut state = store.state.lock().unwrap();
                state.next_number = 1;
                state.articles.push((
                    full_name.to_string(),
                    Article {
                        number: 1,
                        name: full_name.rsplit('/').next().unwrap_or(full_name).to_string(),
                        body_md: body.to_string(),
                        wip: false,
                    },
                    0,
                ));
            }
            store
        }

        pub fn index_lag(mut self, lag: u32) -> Self {
            self.index_lag = lag;
            self
        }

        pub fn template_body(mut self, body: &str) -> Self {
            self.template_body = body.to_string();
            self
        }

        pub fn failing_lookup(mut self) -> Self {
            self.fail_lookup = true;
            self
        }

        /// Fail the next `count` lookups made after a successful create
        pub fn failing_lookups_after_create(mut self, count: u32) -> Self {
            self.state.get_mut().unwrap().post_create_failures = count;
            self
        }

        pub fn failing_create(mut self) -> Self {
            self.fail_create = true;
            self
        }

        pub fn failing_append(mut self) -> Self {
            self.fail_append = true;
            self
        }

        pub fn lookups(&self) -> u32 {
            self.state.lock().unwrap().lookups
        }

        pub fn creates(&self) -> u32 {
            self.state.lock().unwrap().creates
        }

        /// (post number, full body sent) per append, in call order
        pub fn appends(&self) -> Vec<(u64, String)> {
            self.state.lock().unwrap().appends.clone()
        }

        /// Current body of the first article named `full_name`
        pub fn body(&self, full_name: &str) -> Option<String> {
            let state = self.state.lock().unwrap();
            state
                .articles
                .iter()
                .find(|(name, _, _)| name == full_name)
                .map(|(_, article, _)| article.body_md.clone())
        }
    }

    #[async_trait]
    impl ArticleStore for MemoryStore {
        async fn lookup(&self, full_name: &str) -> Result<Option<Article>, RequestError> {
            tokio::task::yield_now().await;

            let mut state = self.state.lock().unwrap();
            state.lookups += 1;
            if self.fail_lookup {
                return Err(rejected());
            }
            if state.created && state.post_create_failures > 0 {
                state.post_create_failures -= 1;
                return Err(rejected());
            }

            for (name, article, lag) in state.articles.iter_mut() {
                if name == full_name {
                    if *lag > 0 {
                        *lag -= 1;
                        continue;
                    }
                    return Ok(Some(article.clone()));
                }
            }
            Ok(None)
        }

        async fn append(&self, article: &Article, entry: &DiaryEntry) -> Result<(), RequestError> {
            tokio::task::yield_now().await;

            if self.fail_append {
                return Err(rejected());
            }

            let body = article.body_with(entry);
            let mut state = self.state.lock().unwrap();
            state.appends.push((article.number, body.clone()));
            if let Some((_, stored, _)) = state
                .articles
                .iter_mut()
                .find(|(_, stored, _)| stored.number == article.number)
            {
                stored.body_md = body;
                stored.wip = true;
            }
            Ok(())
        }

        async fn create_from_template(
            &self,
            category: &str,
            name: &str,
            _template_full_name: &str,
        ) -> Result<(), RequestError> {
            tokio::task::yield_now().await;

            let mut state = self.state.lock().unwrap();
            state.creates += 1;
            if self.fail_create {
                return Err(rejected());
            }

            state.created = true;
            state.next_number += 1;
            let number = state.next_number;
            let full_name = format!("{}/{}", category, name);
            state.articles.push((
                full_name,
                Article {
                    number,
                    name: name.to_string(),
                    body_md: self.template_body.clone(),
                    wip: true,
                },
                self.index_lag,
            ));
            Ok(())
        }
    }
}
