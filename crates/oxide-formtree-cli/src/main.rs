//! formtree CLI
//!
//! Renders and validates forms described in JSON.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_formtree::{ArrayDataSource, Registry};
use oxide_formtree_cli::{build_form, FormDefinition, Report};
use oxide_formtree_render::{ArrayRenderer, DefaultRenderer, RenderOptions};

/// Render and validate JSON form definitions.
#[derive(Parser)]
#[command(name = "formtree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a form, optionally filled with submitted data.
    Render {
        /// Form definition (JSON).
        definition: PathBuf,

        /// Submitted data (JSON object); the form is validated before
        /// rendering.
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Html)]
        format: Format,

        /// Show all errors above the form.
        #[arg(long)]
        group_errors: bool,
    },

    /// Validate submitted data; exits with status 1 when it is invalid.
    Validate {
        /// Form definition (JSON).
        definition: PathBuf,

        /// Submitted data (JSON object).
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Json,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn load_definition(path: &Path) -> Result<FormDefinition> {
    let json = read_json(path)?;
    serde_json::from_value(json)
        .with_context(|| format!("invalid form definition in {}", path.display()))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = Registry::new();

    match cli.command {
        Commands::Render {
            definition,
            data,
            format,
            group_errors,
        } => {
            let def = load_definition(&definition)?;
            let mut form = build_form(&def, &registry)
                .with_context(|| format!("cannot build form from {}", definition.display()))?;
            if let Some(data) = data {
                form.submit_manually(ArrayDataSource::submitted(read_json(&data)?));
                let valid = form.validate();
                info!(valid, "validated submitted data");
            }
            match format {
                Format::Html => {
                    let options = RenderOptions::new().group_errors(group_errors);
                    let mut renderer = DefaultRenderer::with_options(options);
                    form.render(&mut renderer);
                    println!("{renderer}");
                }
                Format::Json => {
                    let mut renderer = ArrayRenderer::new().group_errors(group_errors);
                    form.render(&mut renderer);
                    println!("{}", renderer.to_json()?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { definition, data } => {
            let def = load_definition(&definition)?;
            let mut form = build_form(&def, &registry)
                .with_context(|| format!("cannot build form from {}", definition.display()))?;
            let report = Report::submit(&mut form, read_json(&data)?);

            if report.valid {
                println!("valid");
            } else {
                println!("invalid");
                for (id, message) in &report.errors {
                    println!("  {id}: {message}");
                }
            }
            println!("{}", serde_json::to_string_pretty(&report.values)?);

            Ok(if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
