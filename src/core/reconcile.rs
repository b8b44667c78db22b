//! Reconciler - find-or-create-then-append for the day's article
//!
//! # Flow
//!
//! ```text
//! lookup(full_name)
//!   ├─ found ──────────────────────────────────────────> append
//!   └─ missing ─> create_from_template ─> wait ─> lookup (≤ N tries) ─> append
//! ```
//!
//! The service indexes new posts asynchronously, so an article created a
//! moment ago may not show up in search yet. Only that post-create lookup is
//! retried; every other stage fails straight through with its own error.
//!
//! Runs for the same article are serialized by a per-`full_name` lock, so two
//! quick submissions on a fresh day create one article and neither append
//! overwrites the other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tracing::{debug, info, warn};

use super::article::{Article, DiaryEntry};
use super::path::ArticlePath;
use super::store::ArticleStore;
use crate::config::{DiaryConfig, RetryConfig};
use crate::error::ReconcileError;

/// What a successful submission did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// The day's article already existed
    Appended { full_name: String, number: u64 },
    /// The article was created from the template first
    CreatedAndAppended {
        full_name: String,
        number: u64,
        lookups: u32,
    },
}

impl PostOutcome {
    pub fn full_name(&self) -> &str {
        match self {
            PostOutcome::Appended { full_name, .. }
            | PostOutcome::CreatedAndAppended { full_name, .. } => full_name,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, PostOutcome::CreatedAndAppended { .. })
    }
}

type ArticleLocks = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// Handle on one article's lock. The map entry goes away with the last handle,
/// including when a run is cancelled mid-flight.
struct ArticleLock<'a> {
    locks: &'a ArticleLocks,
    full_name: &'a str,
    lock: Option<Arc<AsyncMutex<()>>>,
}

impl ArticleLock<'_> {
    async fn acquire(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for ArticleLock<'_> {
    fn drop(&mut self) {
        drop(self.lock.take());
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(self.full_name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(self.full_name);
        }
    }
}

/// Appends diary entries to the right day's article. Cheap to clone.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ArticleStore>,
    layout: DiaryConfig,
    retry: RetryConfig,
    locks: Arc<ArticleLocks>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ArticleStore>, layout: DiaryConfig, retry: RetryConfig) -> Self {
        Self {
            store,
            layout,
            retry,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Append `message` to the article for `now`'s date, creating it if needed.
    ///
    /// `now` is local wall-clock time; it picks both the article and the
    /// entry's `HH:MM` stamp.
    pub async fn handle_post(
        &self,
        now: NaiveDateTime,
        message: &str,
    ) -> Result<PostOutcome, ReconcileError> {
        let entry = DiaryEntry::new(now, message).ok_or(ReconcileError::EmptyMessage)?;
        let path = ArticlePath::for_date(now.date(), &self.layout);

        let lock = self.lock_for(path.full_name());
        let guard = lock.acquire().await;
        let outcome = self.reconcile(&path, &entry).await;
        drop(guard);
        outcome
    }

    async fn reconcile(
        &self,
        path: &ArticlePath,
        entry: &DiaryEntry,
    ) -> Result<PostOutcome, ReconcileError> {
        debug!(article = %path, entry = %entry, "reconciling entry");

        let existing = self
            .store
            .lookup(path.full_name())
            .await
            .map_err(|source| ReconcileError::Lookup {
                full_name: path.full_name().to_string(),
                source,
            })?;

        if let Some(article) = existing {
            self.append(path, &article, entry).await?;
            info!(article = %path, number = article.number, "appended entry");
            return Ok(PostOutcome::Appended {
                full_name: path.full_name().to_string(),
                number: article.number,
            });
        }

        info!(article = %path, template = path.template_full_name(), "article missing, creating from template");
        self.store
            .create_from_template(path.category(), path.name(), path.template_full_name())
            .await
            .map_err(|source| ReconcileError::Create {
                full_name: path.full_name().to_string(),
                source,
            })?;

        let (article, lookups) = self.find_after_create(path).await?;
        self.append(path, &article, entry).await?;
        info!(article = %path, number = article.number, lookups, "created article and appended entry");

        Ok(PostOutcome::CreatedAndAppended {
            full_name: path.full_name().to_string(),
            number: article.number,
            lookups,
        })
    }

    /// Poll for a just-created article until search picks it up.
    async fn find_after_create(&self, path: &ArticlePath) -> Result<(Article, u32), ReconcileError> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = None;

        tokio::time::sleep(self.retry.initial_delay()).await;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry.interval()).await;
            }

            match self.store.lookup(path.full_name()).await {
                Ok(Some(article)) => return Ok((article, attempt)),
                Ok(None) => {
                    debug!(article = %path, attempt, attempts, "created article not visible yet");
                }
                Err(e) => {
                    warn!(article = %path, attempt, attempts, error = %e, "lookup after create failed");
                    last_error = Some(e);
                }
            }
        }

        Err(ReconcileError::ArticleNotFoundAfterCreate {
            full_name: path.full_name().to_string(),
            attempts,
            last_error,
        })
    }

    async fn append(
        &self,
        path: &ArticlePath,
        article: &Article,
        entry: &DiaryEntry,
    ) -> Result<(), ReconcileError> {
        self.store
            .append(article, entry)
            .await
            .map_err(|source| ReconcileError::Append {
                full_name: path.full_name().to_string(),
                source,
            })
    }

    fn lock_for<'a>(&'a self, full_name: &'a str) -> ArticleLock<'a> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let lock = locks
            .entry(full_name.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        ArticleLock {
            locks: &self.locks,
            full_name,
            lock: Some(lock),
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}
