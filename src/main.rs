use clap::Parser;
use pgresult::{
    args::{Args, OutputFormat},
    error::PgResultError,
    gate::creation::create_result,
    results::ResultBuffer,
    snapshot::{Snapshot, read_snapshot},
    writer::{Writer, new_columns_writer, new_csv_writer, new_json_writer},
};
use std::{
    fs::File,
    io::{self, BufReader},
    process::ExitCode,
};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pgresult=trace")
        } else {
            EnvFilter::new("pgresult=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load(args: &Args) -> Result<Snapshot, PgResultError> {
    let snapshot = match &args.input {
        Some(path) => read_snapshot(BufReader::new(File::open(path)?))?,
        None => read_snapshot(io::stdin().lock())?,
    };
    Ok(snapshot)
}

fn write(args: &Args, results: &ResultBuffer) -> Result<(), PgResultError> {
    let stdout = io::stdout().lock();
    if args.describe {
        new_columns_writer(stdout).write(results)?;
    } else if results.columns() > 0 {
        match args.output_format {
            OutputFormat::Csv => new_csv_writer(stdout, !args.no_headers).write(results)?,
            OutputFormat::Json => new_json_writer(stdout).write(results)?,
        }
    } else {
        eprintln!("{} row(s) affected", results.affected_rows());
        if let Some(oid) = results.inserted_oid() {
            eprintln!("inserted oid {}", oid);
        }
    }
    Ok(())
}

fn main() -> Result<ExitCode, PgResultError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let Snapshot { query, buffer } = load(&args)?;
    let results = match create_result(buffer, query) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("{}", err.annotated());
            return Ok(ExitCode::FAILURE);
        }
    };
    write(&args, &results)?;

    Ok(ExitCode::SUCCESS)
}
