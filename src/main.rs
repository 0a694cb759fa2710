//! hdlnet - VHDL subset to circuit specification compiler
//!
//! Reads one source file declaring an entity and its architecture and
//! prints the lowered circuit specification as JSON.
//!
//! # Usage
//!
//! ```bash
//! hdlnet and_gate.vhd --pretty > and_gate.json
//! hdlnet and_gate.vhd --emit tokens --log-level debug
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hdl_netlist::{compile_file, dsl, error::Result, NetlistError, SynthConfig};

/// Compiler stage whose output is printed.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Emit {
    /// One token per line
    Tokens,
    /// The parsed syntax tree
    Ast,
    /// The circuit specification as JSON
    Spec,
}

/// VHDL subset to circuit specification compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the source file
    #[arg(value_name = "SOURCE_FILE")]
    source_file: PathBuf,

    /// What to print
    #[arg(long, value_enum, default_value_t = Emit::Spec)]
    emit: Emit,

    /// Indent the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Description stored in the specification
    #[arg(short, long)]
    description: Option<String>,

    /// Logging level written to stderr
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(args.log_level)
        .target(env_logger::Target::Stderr)
        .init();

    match args.emit {
        Emit::Tokens => {
            let source = std::fs::read_to_string(&args.source_file).map_err(|e| NetlistError::FileReadError {
                path: args.source_file.display().to_string(),
                source: e,
            })?;
            for token in dsl::tokenize(&source) {
                println!("{}:{}\t{}", token.line, token.column, token.kind);
            }
        }
        Emit::Ast => {
            for expression in dsl::parse_file(&args.source_file)? {
                println!("{:#?}", expression);
            }
        }
        Emit::Spec => {
            let mut config = SynthConfig::new();
            if let Some(description) = args.description {
                config = config.with_description(description);
            }
            let spec = compile_file(&args.source_file, &config)?;
            let json = if args.pretty {
                spec.to_json_pretty()?
            } else {
                spec.to_json()?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
