//! rfccsv - RFC 4180 CSV codec
//!
//! Parses a CSV file and prints it as JSON, optionally re-rendering it to a
//! normalized CSV file.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use rfccsv::value::infer_record;
use rfccsv::{CsvError, Document, ParseOptions, Rows};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rfccsv", version)]
#[command(about = "Parse, type and re-render RFC 4180 CSV files", long_about = None)]
struct Args {
    /// CSV file to parse
    #[arg(value_name = "FILE")]
    file: String,

    /// Strip spaces and tabs around every field
    #[arg(short, long)]
    trim: bool,

    /// Classify fields as integers, floats or strings
    #[arg(short = 'y', long)]
    typed: bool,

    /// Print one JSON array per chunk of this many records
    #[arg(short, long, value_name = "N", conflicts_with = "output")]
    chunk_size: Option<usize>,

    /// Write the parsed records back out as normalized CSV
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "rfccsv=debug" } else { "rfccsv=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> Result<(), CsvError> {
    serde_json::to_writer(&mut *out, value)
        .map_err(|e| CsvError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    writeln!(out)?;
    Ok(())
}

fn run(args: &Args, out: &mut impl Write) -> Result<(), CsvError> {
    if let Some(chunk_size) = args.chunk_size {
        let chunks = rfccsv::stream_file(&args.file, chunk_size, args.trim)?;
        let mut total = 0;
        if args.typed {
            for chunk in chunks.typed() {
                let chunk = chunk?;
                total += chunk.len();
                print_json(out, &chunk)?;
            }
        } else {
            for chunk in chunks {
                let chunk = chunk?;
                total += chunk.len();
                print_json(out, &chunk)?;
            }
        }
        tracing::info!(file = %args.file, records = total, "streamed");
        return Ok(());
    }

    // typing is applied after reading so --output sees the original field text
    let options = ParseOptions::new().with_trim(args.trim);
    let records: Document = rfccsv::io::read_document(&args.file, &options)?;
    tracing::info!(file = %args.file, records = records.len(), "parsed");

    if let Some(output) = &args.output {
        rfccsv::write(output, &records)?;
        tracing::info!(output = %output, "wrote normalized csv");
    }

    let rows = if args.typed {
        Rows::Typed(records.into_iter().map(infer_record).collect())
    } else {
        Rows::Raw(records)
    };
    print_json(out, &rows)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    tracing::debug!(version = rfccsv::VERSION, file = %args.file, "starting");

    let stdout = std::io::stdout();
    match run(&args, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rfccsv: {}", e);
            ExitCode::FAILURE
        }
    }
}
