use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON snapshot of a statement execution (reads stdin if not set).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output format of the rows.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub output_format: OutputFormat,

    /// Do not write the header line in CSV output.
    #[arg(short, long, default_value_t = false)]
    pub no_headers: bool,

    /// Describe the result columns instead of writing the rows.
    #[arg(short, long, default_value_t = false)]
    pub describe: bool,

    /// Log what is going on (RUST_LOG takes precedence).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
