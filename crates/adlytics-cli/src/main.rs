use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use adlytics_aggregate::{rollup, BucketBy, GroupBy};
use adlytics_cli::{classify, export, report};
use adlytics_core::{partition_test, Classifier, ClassifyConfig, DeliveryRecord, RoasBasis};
use adlytics_ingest::{read_delivery_csv, read_terms_csv, IngestSummary};

#[derive(Parser)]
#[command(name = "adlytics")]
#[command(about = "Ad delivery classification and reporting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve each unique campaign order name to an agency and advertiser
    Classify {
        /// Delivery CSV
        #[arg(long)]
        input: PathBuf,

        /// Classification rules JSON (built-in table when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Output format (json or csv)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Build the full JSON report: buckets, daily series, rolling
    /// comparisons, month-end forecast, pacing
    Report {
        /// Delivery CSV
        #[arg(long)]
        input: PathBuf,

        /// Classification rules JSON (built-in table when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// campaign, advertiser, or agency
        #[arg(long, default_value = "campaign")]
        group_by: String,

        /// daily, weekly, monthly, month, weekday, or total
        #[arg(long, default_value = "daily")]
        bucket: String,

        /// spend or impressions
        #[arg(long, default_value = "spend")]
        roas_basis: String,

        /// Keep test/demo/draft campaigns instead of filtering them out
        #[arg(long)]
        include_test: bool,

        /// Contract terms CSV for pacing
        #[arg(long)]
        terms: Option<PathBuf>,
    },

    /// Write rollup buckets as CSV on stdout
    Export {
        /// Delivery CSV
        #[arg(long)]
        input: PathBuf,

        /// Classification rules JSON (built-in table when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// campaign, advertiser, or agency
        #[arg(long, default_value = "campaign")]
        group_by: String,

        /// daily, weekly, monthly, month, weekday, or total
        #[arg(long, default_value = "daily")]
        bucket: String,

        /// spend or impressions
        #[arg(long, default_value = "spend")]
        roas_basis: String,

        /// Keep test/demo/draft campaigns instead of filtering them out
        #[arg(long)]
        include_test: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the requested document.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adlytics=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Classify {
            input,
            rules,
            format,
        } => cmd_classify(&input, rules.as_deref(), &format),
        Commands::Report {
            input,
            rules,
            group_by,
            bucket,
            roas_basis,
            include_test,
            terms,
        } => cmd_report(
            &input,
            rules.as_deref(),
            &group_by,
            &bucket,
            &roas_basis,
            include_test,
            terms.as_deref(),
        ),
        Commands::Export {
            input,
            rules,
            group_by,
            bucket,
            roas_basis,
            include_test,
        } => cmd_export(
            &input,
            rules.as_deref(),
            &group_by,
            &bucket,
            &roas_basis,
            include_test,
        ),
    }
}

fn build_classifier(rules: Option<&Path>) -> Result<Classifier> {
    let cfg = match rules {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading rules file {}", path.display()))?;
            ClassifyConfig::from_json(&raw)?
        }
        None => ClassifyConfig::default(),
    };
    Ok(Classifier::new(cfg)?)
}

fn load_delivery(input: &Path) -> Result<IngestSummary> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let summary = read_delivery_csv(file)?;
    if summary.skipped_rows > 0 {
        tracing::info!(skipped = summary.skipped_rows, "Rows skipped during ingest");
    }
    Ok(summary)
}

fn production_records(
    summary: IngestSummary,
    classifier: &Classifier,
    include_test: bool,
) -> Vec<DeliveryRecord> {
    if include_test {
        return summary.records;
    }
    let (production, test) = partition_test(summary.records, classifier);
    if !test.is_empty() {
        tracing::info!(excluded = test.len(), "Excluded test campaign rows");
    }
    production
}

fn cmd_classify(input: &Path, rules: Option<&Path>, format: &str) -> Result<()> {
    let classifier = build_classifier(rules)?;
    let summary = load_delivery(input)?;
    let names = classify::unique_identities(&summary.records, &classifier);

    match format {
        "json" => {
            serde_json::to_writer_pretty(io::stdout().lock(), &names)?;
            println!();
        }
        "csv" => classify::write_csv(&names, io::stdout().lock())?,
        _ => bail!("format must be one of: json, csv"),
    }
    Ok(())
}

fn cmd_report(
    input: &Path,
    rules: Option<&Path>,
    group_by: &str,
    bucket: &str,
    roas_basis: &str,
    include_test: bool,
    terms: Option<&Path>,
) -> Result<()> {
    let group_by = GroupBy::parse(Some(group_by))?;
    let bucket_by = BucketBy::parse(Some(bucket))?;
    let basis = RoasBasis::parse(Some(roas_basis))?;

    let classifier = build_classifier(rules)?;
    let summary = load_delivery(input)?;
    let records = production_records(summary, &classifier, include_test);

    let terms = match terms {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            read_terms_csv(file)?
        }
        None => Vec::new(),
    };

    let report = report::build_report(&records, &classifier, group_by, bucket_by, basis, &terms)?;
    serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
    println!();
    Ok(())
}

fn cmd_export(
    input: &Path,
    rules: Option<&Path>,
    group_by: &str,
    bucket: &str,
    roas_basis: &str,
    include_test: bool,
) -> Result<()> {
    let group_by = GroupBy::parse(Some(group_by))?;
    let bucket_by = BucketBy::parse(Some(bucket))?;
    let basis = RoasBasis::parse(Some(roas_basis))?;

    let classifier = build_classifier(rules)?;
    let summary = load_delivery(input)?;
    let records = production_records(summary, &classifier, include_test);

    let buckets = rollup(&records, &classifier, group_by, bucket_by, basis);
    export::write_buckets_csv(&buckets, io::stdout().lock())
}
