// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration management for sketch.
//!
//! ```toml
//! [compiler]
//! forward_calls = true
//! emit_halt = false
//!
//! [output]
//! format = "listing"
//! pretty = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sketch_codegen::CompilerConfig;

use crate::cli::Cli;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "sketch.toml";

/// How a compiled program is written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `{"code": [...], "initAddr": .., "renderAddr": ..}`
    #[default]
    Json,
    /// Disassembly, one instruction per line
    Listing,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Pretty-print JSON
    pub pretty: bool,
}

/// Configuration for sketch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code generator options
    pub compiler: CompilerConfig,

    /// Output settings
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from `explicit`, or from the first default location
    /// that exists. No file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for path in default_paths() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Read a single configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Command line flags take precedence over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(format) = cli.format {
            self.output.format = format;
        }
        if cli.pretty {
            self.output.pretty = true;
        }
        if cli.no_forward_calls {
            self.compiler.forward_calls = false;
        }
        if cli.halt {
            self.compiler.emit_halt = true;
        }
    }
}

/// `./sketch.toml`, then `<config dir>/sketch/sketch.toml`.
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sketch").join(CONFIG_FILE));
    }
    paths
}
