// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command-line configuration and logging bootstrap.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::model::sample::pipeline_flow;
use crate::ops::Editor;
use crate::store::{read_import, ImportError};

const DEFAULT_LOG_FILTER: &str = "flowdeck=info";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowdeck",
    version,
    about = "Terminal editor for infrastructure flow graphs"
)]
pub struct Cli {
    /// Import a node/link document into the first flow at start-up.
    #[arg(long, value_name = "PATH")]
    pub import: Option<PathBuf>,

    /// Directory that receives graph_export.json.
    #[arg(long, env = "FLOWDECK_EXPORT_DIR", default_value = ".", value_name = "DIR")]
    pub export_dir: PathBuf,

    /// Append logs to this file; logging is off without it.
    #[arg(long, env = "FLOWDECK_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Seed for ids, placement and health values.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start with the built-in demo flow.
    #[arg(long)]
    pub demo: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("export directory {} is a regular file", path.display())]
    ExportDirIsFile { path: PathBuf },
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("logging already initialized: {0}")]
    Logging(String),
}

/// Validated start-up settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    import: Option<PathBuf>,
    export_dir: PathBuf,
    log_file: Option<PathBuf>,
    seed: Option<u64>,
    demo: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.export_dir.is_file() {
            return Err(ConfigError::ExportDirIsFile {
                path: cli.export_dir,
            });
        }
        Ok(Self {
            import: cli.import,
            export_dir: cli.export_dir,
            log_file: cli.log_file,
            seed: cli.seed,
            demo: cli.demo,
        })
    }

    pub fn import(&self) -> Option<&Path> {
        self.import.as_deref()
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn demo(&self) -> bool {
        self.demo
    }

    /// Editor the session starts with: the demo flow or an empty one, plus the start-up import.
    pub fn initial_editor(&self) -> Result<Editor, ImportError> {
        let mut editor = match (self.demo, self.seed) {
            (true, seed) => Editor::from_flow(pipeline_flow(), seed),
            (false, Some(seed)) => Editor::with_seed(seed),
            (false, None) => Editor::new(),
        };
        if let Some(path) = &self.import {
            let batch = read_import(path)?;
            let summary = editor.import_batch(batch)?;
            tracing::info!(
                path = %path.display(),
                nodes = summary.nodes,
                links = summary.links,
                "start-up import applied"
            );
        }
        Ok(editor)
    }
}

/// Installs the file logger when a log file is configured. Returns whether logging is on.
///
/// The terminal belongs to the TUI, so nothing is ever logged to stdout or stderr.
pub fn init_logging(config: &Config) -> Result<bool, ConfigError> {
    let Some(path) = config.log_file() else {
        return Ok(false);
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|err| ConfigError::Logging(err.to_string()))?;
    Ok(true)
}
