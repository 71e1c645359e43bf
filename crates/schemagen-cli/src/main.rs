//! schemagen CLI
//!
//! Command-line tool for exporting schema documents as DDL.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use schemagen_core::prelude::*;

/// Export abstract database schemas as executable definition code.
#[derive(Parser)]
#[command(name = "schemagen")]
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
    /// Generate the definition script for a schema document.
    Export {
        /// Schema document path, or `-` for stdin.
        input: String,

        /// Target format (postgres, mysql, mongo). Defaults to the request's
        /// format, then postgres.
        #[arg(short, long, env = "SCHEMAGEN_FORMAT")]
        format: Option<String>,

        /// Output file, or a directory to write `<name>_<format>.<ext>` into.
        #[arg(short, long, env = "SCHEMAGEN_OUTPUT")]
        output: Option<PathBuf>,

        /// Schema name used for the output file name.
        #[arg(short, long, default_value = "schema")]
        name: String,

        /// Print the `{sql, format}` JSON payload instead of the raw script.
        #[arg(long)]
        json: bool,
    },

    /// Check a schema document and show the table creation order.
    Validate {
        /// Schema document path, or `-` for stdin.
        input: String,
    },

    /// List the supported formats.
    Formats,
}

/// Either a bare schema or an export request wrapping one.
enum Document {
    Request(ExportRequest),
    Schema(SchemaData),
}

impl Document {
    /// Decodes a document, telling the two shapes apart by their top-level
    /// key so decoding errors come from the shape that was meant.
    fn from_value(value: Value) -> anyhow::Result<Self> {
        let Some(object) = value.as_object() else {
            anyhow::bail!("expected a JSON object");
        };
        if object.contains_key("data") {
            Ok(Self::Request(serde_json::from_value(value)?))
        } else if object.contains_key("tables") {
            Ok(Self::Schema(serde_json::from_value(value)?))
        } else {
            anyhow::bail!("expected a \"tables\" array or a \"data\" schema")
        }
    }

    fn into_parts(self) -> (SchemaData, Option<String>) {
        match self {
            Self::Request(request) => {
                let format = Some(request.format).filter(|f| !f.is_empty());
                (request.data, format)
            }
            Self::Schema(schema) => (schema, None),
        }
    }
}

fn read_document(input: &str) -> anyhow::Result<Document> {
    let text = if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read schema from stdin")?;
        text
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?
    };
    debug!("Read {} bytes from {}", text.len(), input);
    serde_json::from_str(&text)
        .map_err(anyhow::Error::from)
        .and_then(Document::from_value)
        .with_context(|| format!("Invalid schema document {input}"))
}

fn write_output(body: &str, output: Option<&Path>, name: &str, format: ExportFormat) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(attachment_filename(name, format))
            } else {
                path.to_path_buf()
            };
            fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Export {
            input,
            format,
            output,
            name,
            json,
        } => {
            let (schema, requested) = read_document(&input)?.into_parts();
            let format = ExportFormat::resolve(format.or(requested).as_deref().unwrap_or_default())?;
            info!(
                "Exporting {} tables from {} as {}",
                schema.tables.len(),
                input,
                format
            );

            let sql = export_as(&schema, format)?;
            let body = if json {
                let response = ExportResponse {
                    sql,
                    format: format.as_str().to_string(),
                };
                let mut body = serde_json::to_string_pretty(&response)?;
                body.push('\n');
                body
            } else {
                sql
            };
            write_output(&body, output.as_deref(), &name, format)?;
        }

        Commands::Validate { input } => {
            let (schema, _) = read_document(&input)?.into_parts();
            validate(&schema)?;
            let tables = order(&schema.tables)?;
            info!("Schema is valid ({} tables)", tables.len());
            for (i, table) in tables.iter().enumerate() {
                println!("{}. {}", i + 1, table.name);
            }
        }

        Commands::Formats => {
            for format in ExportFormat::ALL {
                println!("{format}\t.{}", format.file_extension());
            }
        }
    }

    Ok(())
}
