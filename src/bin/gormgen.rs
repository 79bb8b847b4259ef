//! gormgen: GORM model generator CLI
//!
//! # Usage
//!
//! ```bash
//! # From a DDL file
//! gormgen -f schema.sql -o model/tables.go --table-prefix t_ --json
//!
//! # From a live database
//! gormgen --db-url mysql://root@localhost/shop --db-table t_user,t_order
//!
//! # Interactive page and JSON API
//! gormgen --serve
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches, Parser};
use colored::*;
use gormgen::config::{self, DatabaseSettings, PrefixList, Settings};
use gormgen::error::GenError;
use gormgen::{engine, server};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gormgen")]
#[command(version)]
#[command(about = "Generate GORM model structs from MySQL CREATE TABLE statements", long_about = None)]
#[command(after_help = "EXAMPLES:
    gormgen -f schema.sql --table-prefix t_ --json
    gormgen --sql 'CREATE TABLE user (id INT PRIMARY KEY)' --null-style ptr
    gormgen --db-url mysql://root@localhost/shop --db-table t_user -o user.go
    gormgen --serve --address 127.0.0.1:18080")]
struct Cli {
    /// DDL file to read ("-" for stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// DDL text given inline
    #[arg(long)]
    sql: Option<String>,

    /// MySQL URL to read table definitions from
    #[arg(long, env = "GORMGEN_DATABASE_URL")]
    db_url: Option<String>,

    /// Tables to read from the database (default: all)
    #[arg(long = "db-table", value_delimiter = ',')]
    db_tables: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Go package name
    #[arg(long)]
    pkg: Option<String>,

    /// Add json tags
    #[arg(long)]
    json: bool,

    /// json tag naming: snake or declared
    #[arg(long)]
    json_style: Option<String>,

    /// Table name prefixes to strip, comma separated
    #[arg(long)]
    table_prefix: Option<String>,

    /// Column name prefixes to strip, comma separated
    #[arg(long)]
    col_prefix: Option<String>,

    /// Use plain types for nullable columns
    #[arg(long)]
    no_null: bool,

    /// Nullable column representation: sql or ptr
    #[arg(long)]
    null_style: Option<String>,

    /// Write the column type into the gorm tag
    #[arg(long)]
    with_type: bool,

    /// Always generate a TableName() method
    #[arg(long)]
    with_tablename: bool,

    /// Charset override
    #[arg(long)]
    charset: Option<String>,

    /// Collation override
    #[arg(long)]
    collation: Option<String>,

    /// Settings file (default: ./gormgen.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore settings files
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// Serve the interactive page and JSON API instead of converting
    #[arg(long)]
    serve: bool,

    /// Listen address for --serve
    #[arg(long)]
    address: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags as a settings layer; unset flags leave file values alone.
    fn settings(&self) -> Settings {
        Settings {
            package: self.pkg.clone(),
            charset: self.charset.clone(),
            collation: self.collation.clone(),
            json_tag: self.json.then_some(true),
            json_style: self.json_style.clone(),
            table_prefix: self.table_prefix.clone().map(PrefixList::One),
            column_prefix: self.col_prefix.clone().map(PrefixList::One),
            no_null_type: self.no_null.then_some(true),
            null_style: self.null_style.clone(),
            gorm_type: self.with_type.then_some(true),
            force_table_name: self.with_tablename.then_some(true),
            serve_address: self.address.clone(),
            database: DatabaseSettings {
                url: self.db_url.clone(),
                tables: self.db_tables.clone(),
            },
        }
    }
}

/// Where the DDL comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Sql(String),
    File(PathBuf),
    Stdin,
    Database { url: String, tables: Vec<String> },
}

/// No input was given at all; reported with exit code 2.
#[derive(Debug)]
struct MissingInput;

impl std::fmt::Display for MissingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no input given. Use --file, --sql or --db-url")
    }
}

impl std::error::Error for MissingInput {}

impl InputSource {
    /// Pick the single input source. A database URL that only comes from the
    /// environment or a settings file is a fallback, not a competing source.
    fn resolve(cli: &Cli, settings: &Settings, db_url_on_command_line: bool) -> anyhow::Result<Self> {
        let database = || {
            settings.database.url.clone().map(|url| Self::Database {
                url,
                tables: settings.database.tables.clone(),
            })
        };

        let mut sources = Vec::new();
        if let Some(sql) = &cli.sql {
            sources.push(Self::Sql(sql.clone()));
        }
        if let Some(path) = &cli.file {
            if path.as_os_str() == "-" {
                sources.push(Self::Stdin);
            } else {
                sources.push(Self::File(path.clone()));
            }
        }
        if db_url_on_command_line {
            sources.extend(database());
        }

        match sources.len() {
            0 => database().ok_or_else(|| MissingInput.into()),
            1 => Ok(sources.remove(0)),
            _ => Err(GenError::Config(
                "more than one input source given; use only one of --file, --sql, --db-url".to_string(),
            )
            .into()),
        }
    }

    async fn read(&self) -> anyhow::Result<String> {
        match self {
            Self::Sql(sql) => Ok(sql.clone()),
            Self::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            Self::Stdin => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read stdin")?;
                Ok(buf)
            }
            Self::Database { url, tables } => Ok(engine::fetch_schema(url, tables).await?),
        }
    }
}

fn init_tracing(verbose: bool, serve: bool) {
    let default = match (verbose, serve) {
        (true, _) => "gormgen=debug,tower_http=debug",
        (false, true) => "gormgen=info,tower_http=info",
        (false, false) => "gormgen=warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    let db_url_on_command_line = matches.value_source("db_url") == Some(ValueSource::CommandLine);

    init_tracing(cli.verbose, cli.serve);

    if let Err(e) = run(&cli, db_url_on_command_line).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if e.downcast_ref::<MissingInput>().is_some() {
            eprintln!();
            eprintln!("Try: gormgen --help");
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, db_url_on_command_line: bool) -> anyhow::Result<()> {
    let file_settings = if cli.no_config {
        Settings::default()
    } else if let Some(path) = &cli.config {
        Settings::from_file(path)?
    } else {
        match config::load()? {
            Some((path, settings)) => {
                if cli.verbose {
                    eprintln!("{} {}", "Settings:".dimmed(), path.display());
                }
                settings
            }
            None => Settings::default(),
        }
    };
    let settings = file_settings.merge(cli.settings());

    if cli.serve {
        let addr = settings
            .serve_address
            .clone()
            .unwrap_or_else(|| server::DEFAULT_ADDRESS.to_string());
        eprintln!("{} Serving on http://{}", "✓".green(), addr.cyan());
        server::serve(&addr).await?;
        return Ok(());
    }

    let opts = settings.to_options()?;
    let source = InputSource::resolve(cli, &settings, db_url_on_command_line)?;
    if cli.verbose {
        eprintln!("{} {:?}", "Input:".dimmed(), source_label(&source));
    }
    let sql = source.read().await?;

    match &cli.output {
        Some(path) => {
            let code = gormgen::translate(&sql, &opts)?;
            fs::write(path, code).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
        }
        None => {
            let stdout = io::stdout();
            gormgen::translate_to_writer(&sql, &opts, &mut stdout.lock())?;
        }
    }
    Ok(())
}

fn source_label(source: &InputSource) -> String {
    match source {
        InputSource::Sql(_) => "--sql".to_string(),
        InputSource::File(path) => path.display().to_string(),
        InputSource::Stdin => "stdin".to_string(),
        InputSource::Database { tables, .. } if tables.is_empty() => "database (all tables)".to_string(),
        InputSource::Database { tables, .. } => format!("database ({})", tables.join(", ")),
    }
}
