//! CLI module - startup flags
//!
//! The program has no subcommands: it always opens one interactive session.
//! Flags only adjust how that session starts.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// esa-diary - append timestamped notes to today's esa.io diary
///
/// Type a message and press Enter to post it. Quit with Ctrl+C, Esc,
/// or by entering exit / quit / q.
#[derive(Parser, Debug)]
#[command(name = "esa-diary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level (written to --log-file only)
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, env = "ESA_DIARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of recent results kept on screen
    #[arg(long, env = "ESA_DIARY_HISTORY")]
    pub history_limit: Option<NonZeroUsize>,

    /// Append logs to this file
    #[arg(long, env = "ESA_DIARY_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply flag overrides on top of loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some(limit) = self.history_limit {
            config.diary.history_limit = limit.get();
        }
    }
}
