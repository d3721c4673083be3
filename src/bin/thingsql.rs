//! thingsql — The thingsql CLI
//!
//! Prints the SQL generated for things described in JSON schema documents.
//!
//! # Usage
//!
//! ```bash
//! # CREATE TABLE for a thing and everything it references
//! thingsql --schema things.json create parentThing
//!
//! # INSERT with named parameters
//! thingsql --schema things.json insert parentThing --value string=hello --value number=1.5
//!
//! # Filtered, paginated SELECT
//! thingsql --schema things.json select parentThing --field string --where "number > 1" --count 10
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use thingsql::config::Config;
use thingsql::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thingsql")]
#[command(version)]
#[command(about = "Schema-driven SQL generation", long_about = None)]
#[command(after_help = "EXAMPLES:
    thingsql --schema things.json create parentThing
    thingsql --schema things.json insert parentThing --value string=hello --value boolean=true
    thingsql --schema things.json select parentThing --field string --where \"string = 'a b'\" --count 10")]
struct Cli {
    /// Schema documents to register (added to those in the config file)
    #[arg(short, long, global = true)]
    schema: Vec<PathBuf>,

    /// Config file path
    #[arg(short, long, global = true, env = "THINGSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print CREATE TABLE statements for a thing and its references
    Create {
        /// Thing name
        thing: String,
    },
    /// Print an INSERT for a thing
    Insert {
        /// Thing name
        thing: String,

        /// Field values as key=value
        #[arg(long = "value", value_parser = parse_key_value)]
        values: Vec<(String, Value)>,
    },
    /// Print a SELECT for a thing
    Select {
        /// Thing name
        thing: String,

        /// Fields to select
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Filter expression, e.g. "name = 'Ada' AND age > 30"
        #[arg(long = "where")]
        filter: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Rows per page (0 disables pagination)
        #[arg(long)]
        count: Option<u32>,
    },
    /// List registered things
    Things,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "thingsql=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether generation finished without errors.
fn run(cli: &Cli) -> Result<bool> {
    let mut config = Config::load(cli.config.as_deref()).context("loading config")?;
    config.schemas.extend(cli.schema.iter().cloned());
    let store = config.schema_store().context("loading schemas")?;

    match &cli.command {
        Commands::Create { thing } => {
            let generated = CreateTable::new(thing).generate(&store);
            match cli.format {
                OutputFormat::Text => {
                    for sql in generated.output() {
                        println!("{};", sql.white());
                        println!();
                    }
                }
                OutputFormat::Json => print_json(serde_json::json!({
                    "statements": generated.output(),
                    "errors": error_strings(generated.errors()),
                }))?,
            }
            Ok(report(generated.errors(), cli.format))
        }
        Commands::Insert { thing, values } => {
            let insert = InsertIntoTable {
                thing_name: thing.clone(),
                values: values.iter().cloned().collect(),
            };
            let generated = insert.generate(&store);
            let query = generated.output();
            match cli.format {
                OutputFormat::Text => {
                    println!("{}", query.sql.white());
                    if !query.params.is_empty() {
                        println!();
                        println!("{}", "Parameters:".cyan());
                        for (name, value) in &query.params {
                            println!("  :{} = {}", name, value.to_string().yellow());
                        }
                    }
                }
                OutputFormat::Json => {
                    let params: BTreeMap<&str, &Value> =
                        query.params.iter().map(|(name, value)| (name.as_str(), value)).collect();
                    print_json(serde_json::json!({
                        "sql": query.sql,
                        "params": params,
                        "errors": error_strings(generated.errors()),
                    }))?
                }
            }
            Ok(report(generated.errors(), cli.format))
        }
        Commands::Select {
            thing,
            fields,
            filter,
            page,
            count,
        } => {
            let mut select = SelectFromTable::new(thing)
                .paginate(*page, count.unwrap_or(config.default_count));
            for field in fields {
                select = select.field(field);
            }
            if let Some(filter) = filter {
                select = select.filter(filter);
            }

            let generated = select.generate(&store);
            let query = generated.output();
            match cli.format {
                OutputFormat::Text => {
                    println!("{}", query.sql.white());
                    if !query.where_values.is_empty() {
                        println!();
                        println!("{}", "Bindings:".cyan());
                        for (i, value) in query.where_values.iter().enumerate() {
                            println!("  ${} = {}", i + 1, value.yellow());
                        }
                    }
                }
                OutputFormat::Json => print_json(serde_json::json!({
                    "sql": query.sql,
                    "whereValues": query.where_values,
                    "errors": error_strings(generated.errors()),
                }))?,
            }
            Ok(report(generated.errors(), cli.format))
        }
        Commands::Things => {
            match cli.format {
                OutputFormat::Text => {
                    if store.is_empty() {
                        println!("{}", "(no things registered)".dimmed());
                    }
                    for name in store.names() {
                        let thing = store.get(name)?;
                        println!("{} {}", name.cyan(), format!("\"{}\"", thing.table_name()).dimmed());
                        for field in thing.fields() {
                            println!("  • {} {}", field.name.white(), field.field_type.to_string().yellow());
                        }
                    }
                }
                OutputFormat::Json => print_json(serde_json::json!(store.names()))?,
            }
            Ok(true)
        }
    }
}

/// Print collected errors in text mode; true when there were none.
fn report(errors: &ThingErrors, format: OutputFormat) -> bool {
    if errors.is_empty() {
        return true;
    }
    if let OutputFormat::Text = format {
        eprintln!();
        eprintln!("{}", "Errors:".red().bold());
        for err in errors {
            eprintln!("  {} {}", "✗".red(), err);
        }
    }
    false
}

fn error_strings(errors: &ThingErrors) -> Vec<String> {
    errors.iter().map(|e| e.to_string()).collect()
}

fn print_json(value: serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.trim().to_string(), parse_value(raw.trim())))
}

/// Interpret a CLI value: `YYYY-MM-DD`, then a JSON scalar, else plain text.
fn parse_value(raw: &str) -> Value {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Value::Date(date);
    }
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Null) => Value::Null,
        Ok(serde_json::Value::Bool(b)) => Value::Boolean(b),
        Ok(serde_json::Value::Number(n)) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        Ok(serde_json::Value::String(s)) => Value::String(s),
        _ => Value::String(raw.to_string()),
    }
}
