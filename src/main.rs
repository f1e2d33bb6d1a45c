mod corpus;
mod parser;
mod settings;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use parser::tables::TableKind;
use parser::{DocumentResult, Pipeline};
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "numeral_tables",
    about = "Extract numeral tables and language codes from numeral-system HTML pages"
)]
struct Cli {
    /// Settings file (default: ./numerals.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Numeric cells needed to call a table a numeral table
    #[arg(long, global = true)]
    threshold: Option<usize>,
    /// Class attribute of candidate tables
    #[arg(long, global = true)]
    table_class: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the documents that would be processed, in order
    List {
        /// Directory holding the raw HTML pages
        dir: PathBuf,
    },
    /// Run the pipeline over every document and write JSON results
    Extract {
        /// Directory holding the raw HTML pages
        dir: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Max documents to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Show how each table of one document is classified
    Inspect {
        /// A single HTML page
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(threshold) = cli.threshold {
        settings.threshold = threshold;
    }
    if let Some(class) = cli.table_class {
        settings.table_class = class;
    }
    settings.validate()?;

    match cli.command {
        Commands::List { dir } => {
            let docs = corpus::discover(&dir, &settings.skip)?;
            for doc in &docs {
                println!("{}\t{}", doc.name, doc.path.display());
            }
            eprintln!("{} documents", docs.len());
        }
        Commands::Extract {
            dir,
            out,
            limit,
            pretty,
        } => {
            let mut docs = corpus::discover(&dir, &settings.skip)?;
            if let Some(n) = limit {
                docs.truncate(n);
            }
            if docs.is_empty() {
                eprintln!("No documents found in {}.", dir.display());
                return Ok(());
            }

            info!(
                documents = docs.len(),
                table_class = %settings.table_class,
                threshold = settings.threshold,
                "extracting"
            );
            let pipeline = Pipeline::from_settings(&settings)?;
            let (results, counts) = extract_all(&pipeline, &docs);
            write_results(&results, out.as_deref(), pretty)?;
            counts.print();
        }
        Commands::Inspect { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let pipeline = Pipeline::from_settings(&settings)?;
            let reports = pipeline.inspect(&raw);
            if reports.is_empty() {
                println!("No tables with class {:?}.", settings.table_class);
                return Ok(());
            }

            println!(
                "{:>3} | {:>5} | {:>7} | {:>9} | {:<7} | {}",
                "#", "Cells", "Numbers", "Largest", "Kind", "Code"
            );
            println!("{}", "-".repeat(52));
            for r in &reports {
                let kind = match r.kind {
                    TableKind::Numeral => "numeral",
                    TableKind::Other => "other",
                };
                let largest = r.largest.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{:>3} | {:>5} | {:>7} | {:>9} | {:<7} | {}",
                    r.index,
                    r.cells,
                    r.numbers,
                    largest,
                    kind,
                    r.code.as_deref().unwrap_or("-")
                );
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    Ok(())
}

#[derive(Default)]
struct RunCounts {
    documents: usize,
    numeral_tables: usize,
    other_tables: usize,
    codes: usize,
    unreadable: usize,
}

impl RunCounts {
    fn record(&mut self, result: &DocumentResult) {
        self.documents += 1;
        self.numeral_tables += result.numeral_tables.len();
        self.other_tables += result.other_tables;
        self.codes += result.codes.len();
    }

    fn print(&self) {
        eprintln!(
            "Processed {} documents: {} numeral tables, {} other tables, {} codes, {} unreadable.",
            self.documents, self.numeral_tables, self.other_tables, self.codes, self.unreadable,
        );
    }
}

fn extract_all(
    pipeline: &Pipeline,
    docs: &[corpus::DocumentRef],
) -> (Vec<DocumentResult>, RunCounts) {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut counts = RunCounts::default();
    let mut results = Vec::with_capacity(docs.len());

    for chunk in docs.chunks(200) {
        for outcome in parser::process_batch(pipeline, chunk) {
            match outcome {
                Ok(result) => {
                    counts.record(&result);
                    results.push(result);
                }
                Err(e) => {
                    counts.unreadable += 1;
                    warn!("{:#}", anyhow::Error::from(e));
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    (results, counts)
}

fn write_results(results: &[DocumentResult], out: Option<&Path>, pretty: bool) -> Result<()> {
    let sink: Box<dyn Write> = match out {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(sink);

    if pretty {
        serde_json::to_writer_pretty(&mut writer, results)?;
    } else {
        serde_json::to_writer(&mut writer, results)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = out {
        info!("Wrote {} results to {}", results.len(), path.display());
    }
    Ok(())
}
