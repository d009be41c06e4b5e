// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for sketch.

use std::path::PathBuf;

use clap::Parser;

use crate::config::OutputFormat;

/// sketch - compile a Sketch AST into MVM bytecode
#[derive(Parser, Debug)]
#[command(name = "sketch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON AST produced by the Sketch parser (stdin when omitted or "-")
    pub input: Option<PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Require every call to name an already defined function
    #[arg(long)]
    pub no_forward_calls: bool,

    /// Append a HALT instruction to the program
    #[arg(long)]
    pub halt: bool,

    /// Configuration file (default: ./sketch.toml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Input path, or `None` for stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "sketch",
            "scene.json",
            "-f",
            "listing",
            "--no-forward-calls",
            "--halt",
            "-o",
            "scene.mvm",
        ]);
        assert_eq!(cli.input_path(), Some(&PathBuf::from("scene.json")));
        assert_eq!(cli.format, Some(OutputFormat::Listing));
        assert!(cli.no_forward_calls);
        assert!(cli.halt);
        assert!(!cli.pretty);
        assert_eq!(cli.output, Some(PathBuf::from("scene.mvm")));
    }

    #[test]
    fn test_dash_means_stdin() {
        let cli = Cli::parse_from(["sketch", "-"]);
        assert_eq!(cli.input_path(), None);

        let cli = Cli::parse_from(["sketch"]);
        assert_eq!(cli.input_path(), None);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["sketch", "-f", "yaml"]).is_err());
    }
}
