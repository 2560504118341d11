//! blockgate: check a restriction config against a saved document.
//!
//! Usage:
//!   blockgate check --config gate.ron --document post.json
//!   blockgate check --config gate.ron --document post.json --template tpl-super --json
//!   blockgate validate --config gate.ron

mod check;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::{EnvFilter, fmt};

use blockgate_kernel::GateConfig;
use blockgate_types::{BlockNode, BlockType, TemplateCatalog, TemplateId};

use check::{CheckInput, CheckReport, run_check};

/// Offline checker for block/template restriction configs.
#[derive(Parser, Debug)]
#[command(name = "blockgate")]
#[command(about = "Check block and template restrictions against a document")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Settle both controllers once and print the resulting editor state
    Check {
        /// Restriction config (RON)
        #[arg(short, long)]
        config: PathBuf,

        /// Block tree (JSON array of `{ "kind", "children" }` or `{ "name", "innerBlocks" }`)
        #[arg(short, long)]
        document: PathBuf,

        /// Selected template; unset means the default template
        #[arg(short, long)]
        template: Option<String>,

        /// Template catalog (JSON object of id to label)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Registered block types (JSON array of `{ "kind", "title", ... }`)
        #[arg(long)]
        block_types: Option<PathBuf>,

        /// Render the notice as if the page-attributes panel were hidden
        #[arg(long)]
        no_sidebar: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a restriction config
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Check {
            config,
            document,
            template,
            templates,
            block_types,
            no_sidebar,
            json,
        } => {
            let config = load_config(&config)?;
            let template = template
                .map(|t| TemplateId::parse(&t))
                .transpose()
                .context("invalid --template")?;
            let input = CheckInput {
                document: read_json::<Vec<BlockNode>>(&document)?,
                template,
                catalog: templates.as_deref().map(read_json::<TemplateCatalog>).transpose()?,
                block_types: block_types.as_deref().map(read_json::<Vec<BlockType>>).transpose()?,
                sidebar_open: !no_sidebar,
            };

            let report = run_check(&config, input);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Validate { config } => {
            let config = load_config(&config)?;
            println!(
                "ok: {} restricted block kinds, default template {}, renarrow on {}",
                config.restrictions.len(),
                config.default_template,
                config.renarrow
            );
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<GateConfig> {
    GateConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn joined<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_report(report: &CheckReport) {
    println!("template: {}", report.template);

    println!("restricted blocks: {}", joined(&report.restricted_blocks));
    println!("registered: {}", joined(&report.registered));
    println!("unregistered: {}", joined(&report.unregistered));

    let offered: Vec<String> = report
        .offered_templates
        .iter()
        .map(|(id, desc)| format!("{id} ({})", desc.label))
        .collect();
    println!("offered templates: {}", joined(&offered));

    match &report.notice {
        Some(notice) => {
            println!("notice: {}", notice.message);
            for item in &notice.items {
                println!("  - {item}");
            }
        }
        None => println!("notice: hidden"),
    }
    tracing::debug!(rounds = report.rounds, "report printed");
}
