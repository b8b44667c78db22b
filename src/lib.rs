//! esa-diary - daily diary on esa.io from the terminal
//!
//! Appends `HH:MM message` lines to one article per day, creating the day's
//! article from a template the first time.
//!
//! # Key Concepts
//!
//! - **Article path**: `dairy/YY/MM/DD/dairy`, derived from the local date
//! - **Reconciliation**: find-or-create-then-append, retrying the lookup while
//!   the service indexes a freshly created article
//! - **Append-only**: entries are added to the end of the body, never edited
//! - **Non-blocking session**: posts run in the background while typing continues

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod remote;
pub mod session;

pub use crate::config::Config;
pub use crate::core::article::{Article, DiaryEntry};
pub use crate::core::path::ArticlePath;
pub use crate::core::reconcile::{PostOutcome, Reconciler};
pub use crate::core::store::ArticleStore;
pub use crate::error::{ConfigError, ReconcileError, RequestError};
pub use crate::remote::EsaClient;
