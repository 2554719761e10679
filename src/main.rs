//! Fleetdb CLI - administrative access to the fleet database

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleetdb::{Config, Gateway, ResultSet, SqlValue};

#[derive(Parser)]
#[command(name = "fleetdb")]
#[command(version = "0.1.0")]
#[command(about = "Fleet-management data layer - dual-backend SQL gateway")]
#[command(long_about = r#"
Fleetdb tracks vehicles, drivers, checkout history, and user accounts in a
relational store with two interchangeable backends:
  • embedded SQLite persisted to a local file (development)
  • remote libSQL database (APP_ENV=production)

Example usage:
  fleetdb init
  fleetdb exec "SELECT id, model FROM vehicles"
  fleetdb run "UPDATE vehicles SET isCheckedOut = TRUE WHERE id = ?" RSB7C87
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to fleetdb.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and seed rows if they do not already exist
    Init,

    /// Execute a mutating statement and persist the result
    Run {
        /// SQL text with positional placeholders
        sql: String,

        /// Values bound to the placeholders, in order
        params: Vec<String>,
    },

    /// Execute a row-returning statement
    Exec {
        /// SQL text with positional placeholders
        sql: String,

        /// Values bound to the placeholders, in order
        params: Vec<String>,

        /// Emit JSON instead of a table
        #[arg(short, long)]
        json: bool,
    },

    /// Persist the in-memory development database to its file
    Save,
}

/// Positional CLI arguments become typed parameters: integers and reals are
/// detected, "null" binds NULL, everything else binds as text.
fn parse_param(raw: &str) -> SqlValue {
    if raw.eq_ignore_ascii_case("null") {
        return SqlValue::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return SqlValue::Integer(i);
    }
    if let Ok(r) = raw.parse::<f64>() {
        return SqlValue::Real(r);
    }
    SqlValue::Text(raw.to_string())
}

fn render_table(set: &ResultSet) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(set.columns.iter().cloned());
    for tuple in &set.values {
        builder.push_record(tuple.iter().map(ToString::to_string));
    }
    let mut table = builder.build();
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let gateway = Gateway::from_config(&config).await?;

    match cli.command {
        Commands::Init => {
            gateway.initialize().await?;
            println!("Database initialized");
        }

        Commands::Run { sql, params } => {
            let params: Vec<SqlValue> = params.iter().map(|p| parse_param(p)).collect();
            let outcome = gateway.run_query(&sql, &params).await?;
            gateway.save().await?;
            println!(
                "{} row(s) affected, last insert id {}",
                outcome.rows_affected, outcome.last_insert_id
            );
        }

        Commands::Exec { sql, params, json } => {
            let params: Vec<SqlValue> = params.iter().map(|p| parse_param(p)).collect();
            let result = gateway.exec_query(&sql, &params).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for set in &result {
                    println!("{}", render_table(set));
                    println!("{} row(s)", set.values.len());
                }
            }
        }

        Commands::Save => {
            gateway.save().await?;
            println!("Database saved");
        }
    }

    Ok(())
}
