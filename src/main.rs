use std::path::PathBuf;

use clap::{Parser, Subcommand};
use phaseseed::{augment::Options, phase::TopK, pipeline, report::Report};
use pretty_env_logger::formatted_builder;

/// Seeds SAT solvers with externally predicted assignments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Writes an initial-phase hint file from ranked confidence records
    Phases {
        /// Confidence records, one JSON object per line, sorted by descending confidence
        #[arg(short, long)]
        input: PathBuf,
        /// Phase hint file to write
        #[arg(short, long)]
        output: PathBuf,
        /// Only apply the leading records, as a fraction of the variable count in (0, 1]
        #[arg(long)]
        topk: Option<TopK>,
    },
    /// Appends a model's literals to a DIMACS CNF as unit clauses
    Augment {
        /// Input DIMACS CNF file
        #[arg(short, long)]
        input: PathBuf,
        /// Model text ('v ...' lines terminated by 0)
        #[arg(short, long)]
        assign: PathBuf,
        /// Output CNF file
        #[arg(short, long)]
        output: PathBuf,
        /// Remove duplicate unit clauses (same literal)
        #[arg(long)]
        dedup: bool,
    },
    /// Validates a phase hint file, optionally against a CNF's variable count
    CheckPhases {
        /// Phase hint file to read
        #[arg(short, long)]
        input: PathBuf,
        /// CNF whose declared variable count must match the entry count
        #[arg(long)]
        cnf: Option<PathBuf>,
    },
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        if cfg!(debug_assertions) {
            builder.parse_filters("phaseseed=info");
        } else {
            builder.parse_filters("phaseseed=warn");
        }
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    let args = Args::parse();

    match args.command {
        Command::Phases {
            input,
            output,
            topk,
        } => {
            let summary = pipeline::generate_phases(&input, &output, topk)?;
            println!(
                "wrote '{}' ({} entries)",
                output.display(),
                summary.entries
            );
        }
        Command::Augment {
            input,
            assign,
            output,
            dedup,
        } => {
            let summary = pipeline::augment_file(&input, &assign, &output, Options { dedup })?;
            println!(
                "wrote '{}' with header '{}' (added {} unit clauses)",
                output.display(),
                summary.header,
                summary.added
            );
        }
        Command::CheckPhases { input, cnf } => {
            let counts = pipeline::check_phases(&input, cnf.as_deref())?;
            println!(
                "'{}': +1={}, -1={}, d={} (total {})",
                input.display(),
                counts.positive,
                counts.negative,
                counts.dont_care,
                counts.positive + counts.negative + counts.dont_care
            );
        }
    }

    Ok(())
}
