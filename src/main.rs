// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Sketch - bytecode generator for the Sketch drawing language
//!
//! Reads the parser's JSON tree and writes the compiled MVM program.
//!
//! ## Usage
//!
//! ```text
//! sketch scene.json                 # JSON program on stdout
//! sketch scene.json -f listing      # disassembly
//! cat scene.json | sketch -o out.json --pretty
//! ```

mod cli;
mod config;

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use sketch_codegen::{Ast, CompiledProgram, Compiler, disassemble};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{Config, OutputConfig, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "sketch=debug,sketch_codegen=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(cli);

    let source = read_input(cli.input_path().map(|p| p.as_path()))?;
    let ast = Ast::from_json(&source).context("failed to decode the AST")?;

    let program = Compiler::with_config(config.compiler.clone())
        .compile(&ast)
        .context("code generation failed")?;

    let rendered = render(&program, &config.output)?;
    write_output(cli.output.as_deref(), &rendered)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read stdin")?;
            Ok(source)
        }
    }
}

fn render(program: &CompiledProgram, output: &OutputConfig) -> Result<String> {
    let mut text = match output.format {
        OutputFormat::Json if output.pretty => serde_json::to_string_pretty(program)?,
        OutputFormat::Json => serde_json::to_string(program)?,
        OutputFormat::Listing => return Ok(disassemble(program)),
    };
    text.push('\n');
    Ok(text)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
