//! One-shot batch run over a CSV file.
//!
//! analyze_csv <input.csv> [--engine NAME] [--granularity G] [--records OUT] [--aggregates OUT]
//!
//! CSVs are written only to the paths given; stdout always gets a plain-text
//! summary (record/label counts and one line per bucket).

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use market_sentiment::{
    export, ingest, run_batch, ClassifierEngine, EngineKind, Engines, Granularity, Label,
    PipelineConfig, Report,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: analyze_csv <input.csv> [--engine NAME] [--granularity G] \
                     [--records OUT] [--aggregates OUT]";

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    engine: Option<EngineKind>,
    granularity: Option<Granularity>,
    records_out: Option<PathBuf>,
    aggregates_out: Option<PathBuf>,
}

fn parse_args(mut it: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut input = None;
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--engine" => args.engine = Some(value("--engine")?.parse()?),
            "--granularity" => args.granularity = Some(value("--granularity")?.parse()?),
            "--records" => args.records_out = Some(value("--records")?.into()),
            "--aggregates" => args.aggregates_out = Some(value("--aggregates")?.into()),
            "-h" | "--help" => bail!(USAGE),
            s if s.starts_with("--") => bail!("unknown flag {s}\n{USAGE}"),
            _ if input.is_none() => input = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }
    args.input = input.context(USAGE)?;
    Ok(args)
}

fn run(args: Args) -> Result<()> {
    let mut cfg = PipelineConfig::load_default()?;
    if let Some(e) = args.engine {
        cfg.engine = e;
    }
    if let Some(g) = args.granularity {
        cfg.granularity = g;
    }

    let classifier = Arc::new(ClassifierEngine::new());
    if cfg.engine == EngineKind::Classifier {
        classifier.train(&cfg.load_training_corpus()?)?;
    }
    let engines = Engines::new(classifier);

    let records = ingest::read_csv_path(&args.input)?;
    let report = run_batch(records, engines.select(cfg.engine), cfg.granularity)?;

    if let Some(p) = &args.records_out {
        export::write_records_csv(create(p)?, &report.records)?;
    }
    if let Some(p) = &args.aggregates_out {
        export::write_aggregates_csv(create(p)?, &report.aggregates)?;
    }

    print!("{}", summary(&report));
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(f))
}

/// Human-readable batch summary; never CSV.
fn summary(report: &Report) -> String {
    let count = |label: Label| {
        report
            .records
            .iter()
            .filter(|r| r.label() == Some(label))
            .count()
    };
    let mut out = format!(
        "{} records scored with {} (positive {}, negative {}, neutral {})\n",
        report.records.len(),
        report.engine,
        count(Label::Positive),
        count(Label::Negative),
        count(Label::Neutral),
    );
    let _ = writeln!(out, "{} {} buckets:", report.aggregates.len(), report.granularity);
    for b in &report.aggregates {
        let _ = writeln!(
            out,
            "  {}  mean {:+.3}  n={}",
            b.bucket_start.format("%Y-%m-%d %H:%M"),
            b.score_mean,
            b.count
        );
    }
    out
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let outcome = parse_args(std::env::args().skip(1)).and_then(run);
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "analysis failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
