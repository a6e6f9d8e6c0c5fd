// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridPulse.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridpulse", version, about = "PowerAlert grid forecast monitor")]
pub struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Refresh periodically until interrupted (default)
    Run,

    /// Run a single refresh cycle and print the snapshot
    Once,

    /// Print the live current-status record
    Status,

    /// Print one metric of the current hour
    Metric {
        /// margin, demand, capacity, utilization or reserve_margin
        name: String,
    },

    /// Check whether a system state holds right now
    Check {
        /// critical, high_utilization, stable or improving
        state: String,
    },

    /// Find the lowest-demand window inside a daily time range
    Window {
        /// Desired duration in minutes
        #[arg(short, long, default_value_t = 120)]
        duration: u32,

        /// Earliest start time (HH:MM)
        #[arg(long, default_value = "00:00")]
        start: String,

        /// Latest start time (HH:MM)
        #[arg(long, default_value = "23:59")]
        end: String,
    },

    /// Score the outage risk of the current hour
    Risk {
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        sensitivity: String,
    },

    /// Print the color timeline of the coming hours
    Timeline {
        #[arg(long, default_value_t = 24)]
        hours: usize,
    },

    /// Export the coming hours as CSV or JSON
    Export {
        #[arg(long, default_value_t = 24)]
        hours: usize,

        /// csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Write into the export directory instead of stdout
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    #[must_use]
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
