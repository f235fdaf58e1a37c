//! CLI entry point for `order-extract`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use order_extract::config::{self, Config};
use order_extract::{CsvOptions, Extractor, MessageFilter, export_csv, source};

#[derive(Parser)]
#[command(name = "order-extract", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (overrides $ORDER_EXTRACT_CONFIG)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract order items from exported messages into CSV
    Extract {
        /// Gmail JSON files, .eml files, or directories of them
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<PathBuf>,

        /// Template name
        #[arg(short, long)]
        template: Option<String>,

        #[command(flatten)]
        search: SearchArgs,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out the Mail ID and To Email columns
        #[arg(long)]
        no_message_ids: bool,

        /// Write a UTF-8 BOM for Excel
        #[arg(long)]
        bom: bool,
    },
    /// List available templates
    Templates,
    /// Print the mailbox search query for the configured filter
    Query {
        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Full search query, e.g. "label:orders after:2022-09-24"
    #[arg(long)]
    query: Option<String>,

    /// Required label
    #[arg(long)]
    label: Option<String>,

    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    after: Option<String>,

    /// First day excluded (YYYY-MM-DD)
    #[arg(long)]
    before: Option<String>,
}

impl SearchArgs {
    /// Config filter with command-line terms applied on top
    fn resolve(&self, config: &Config) -> anyhow::Result<MessageFilter> {
        let base = match &self.query {
            Some(query) => MessageFilter::parse(query)?,
            None => config.filter()?,
        };
        Ok(base.with_overrides(
            self.label.as_deref(),
            self.after.as_deref(),
            self.before.as_deref(),
        )?)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);

    match cli.command {
        Commands::Extract {
            inputs,
            template,
            search,
            output,
            no_message_ids,
            bom,
        } => {
            let filter = search.resolve(&config)?;
            let mut options = config.csv_options();
            options.include_message_ids &= !no_message_ids;
            options.bom |= bom;
            let output = output
                .or_else(|| config.export.output.clone())
                .unwrap_or_else(|| PathBuf::from(filter.csv_file_name()));
            cmd_extract(&config, &inputs, template.as_deref(), filter, &output, &options)
        }
        Commands::Templates => cmd_templates(&config),
        Commands::Query { search } => {
            println!("{}", search.resolve(&config)?.to_query());
            Ok(())
        }
    }
}

/// Set up tracing with stderr output.
fn setup_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_extract(
    config: &Config,
    inputs: &[PathBuf],
    template: Option<&str>,
    filter: MessageFilter,
    output: &Path,
    options: &CsvOptions,
) -> anyhow::Result<()> {
    let templates = config.template_set()?;
    let template = templates.get(template.unwrap_or(&config.general.template))?;

    let files = source::collect_files(inputs)?;
    if files.is_empty() {
        anyhow::bail!("No .json or .eml files found in the given inputs");
    }

    if !filter.is_empty() {
        println!("  Search: {}", filter.to_query());
    }

    let report = Extractor::new(template)
        .with_filter(filter)
        .with_max_tokens(config.scan.max_tokens)
        .run(source::load_messages(&files));

    export_csv(output, &report.records, options)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    for skipped in &report.skipped {
        eprintln!(
            "  skipped {}: {}",
            skipped.message_id.as_deref().unwrap_or("-"),
            skipped.reason
        );
    }

    println!("  Template:  {}", template.name);
    println!("  Processed: {} message(s)", report.processed);
    println!("  Skipped:   {} message(s)", report.skipped.len());
    println!("  Filtered:  {} message(s)", report.filtered);
    println!(
        "  Wrote {} record(s) to {}",
        report.records.len(),
        output.display()
    );

    Ok(())
}

fn cmd_templates(config: &Config) -> anyhow::Result<()> {
    let templates = config.template_set()?;
    for template in templates.iter() {
        let marker = if template.name == config.general.template {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<16} <{}> {} fingerprint(s), tracking \"{}\" +{}, ship-to \"{}\" x{}",
            template.name,
            template.container_tag,
            template.fingerprints.len(),
            template.tracking_sentinel,
            template.tracking_lookahead,
            template.ship_to_sentinel,
            template.ship_to_lines,
        );
    }
    Ok(())
}
