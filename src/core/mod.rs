//! Core module - Business logic
//!
//! Contains the diary data structures and the reconciliation workflow.

pub mod article;
pub mod history;
pub mod path;
pub mod reconcile;
pub mod store;
