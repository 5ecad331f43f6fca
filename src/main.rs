// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdeck and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowdeck CLI entrypoint.
//!
//! Parses flags, installs the optional file logger, builds the start-up editor and runs the TUI.

use std::error::Error;

use clap::Parser;
use flowdeck::config::{init_logging, Cli, Config};

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let config = Config::from_cli(Cli::parse())?;
        init_logging(&config)?;
        tracing::info!(
            demo = config.demo(),
            seed = ?config.seed(),
            import = ?config.import(),
            "starting"
        );

        let editor = config.initial_editor()?;
        flowdeck::tui::run(&config, editor)
    })();

    if let Err(err) = result {
        tracing::error!(%err, "exiting with error");
        eprintln!("flowdeck: {err}");
        std::process::exit(1);
    }
}
