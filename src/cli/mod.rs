// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use crate::core::vendor::Vendor;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// 生成するDDLの種類
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlMode {
    /// CREATE statements in dependency order (default)
    #[default]
    Create,
    /// DROP statements in reverse dependency order
    Drop,
    /// Statements that delete all rows, in reverse dependency order
    Truncate,
}

/// ddlforge - Cross-vendor DDL generator
///
/// Generates dependency-ordered DDL scripts for Derby, MySQL, PostgreSQL,
/// Oracle, SQLite and DB2 from a single vendor-neutral YAML schema.
#[derive(Parser, Debug)]
#[command(name = "ddlforge")]
#[command(author = "ddlforge Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cross-vendor DDL generator")]
#[command(long_about = "ddlforge - Cross-vendor DDL generator

Reads a vendor-neutral YAML schema description and generates SQL DDL
for each supported database vendor.

ddlforge helps you:
  • Translate abstract column types into each vendor's type declarations
  • Order CREATE, DROP and TRUNCATE statements by foreign key dependencies
  • Validate a schema against a vendor's type limits before deployment
  • Apply the generated DDL to a live database in a single transaction

Supported databases: Derby, MySQL, PostgreSQL, Oracle, SQLite, DB2")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Describe your tables:          Edit schema.yaml
  2. Check the schema:              ddlforge validate --vendor postgresql
  3. Generate DDL:                  ddlforge generate --vendor postgresql
  4. Apply to a database:           ddlforge apply --url sqlite://app.db

For detailed help on each command, use: ddlforge <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a DDL script from the schema
    ///
    /// Resolves abstract table inheritance, orders the tables by their
    /// foreign key dependencies and renders the statements for one vendor.
    ///
    /// EXAMPLES:
    ///   # Generate CREATE statements for PostgreSQL
    ///   ddlforge generate --vendor postgresql
    ///
    ///   # Generate conditional DROP statements for Oracle into a file
    ///   ddlforge generate --vendor oracle --mode drop --if-not-exists -o drop.sql
    Generate {
        /// Target vendor (derby, mysql, postgresql, oracle, sqlite, db2)
        #[arg(long, value_name = "VENDOR")]
        vendor: Option<Vendor>,

        /// Path to schema file
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Kind of statements to generate
        #[arg(short, long, value_enum, default_value = "create")]
        mode: DdlMode,

        /// Emit conditional DDL (create only if missing, drop only if present)
        #[arg(long)]
        if_not_exists: bool,

        /// Do not emit CREATE INDEX statements
        #[arg(long)]
        no_indexes: bool,

        /// Do not emit CHECK constraints for enum columns
        #[arg(long)]
        no_enum_checks: bool,

        /// Omit the header comment
        #[arg(long)]
        no_header: bool,

        /// Write the script to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the table creation order
    ///
    /// Prints the order in which tables are created, along with the tables
    /// each one depends on.
    ///
    /// EXAMPLES:
    ///   ddlforge order
    ///   ddlforge order --reverse --format json
    Order {
        /// Path to schema file
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Show the drop/truncate order instead
        #[arg(long)]
        reverse: bool,
    },

    /// Validate the schema
    ///
    /// Checks duplicate definitions, references, inheritance and foreign key
    /// cycles. With a vendor, also checks every column type and referential
    /// action against that vendor's limits.
    ///
    /// EXAMPLES:
    ///   ddlforge validate
    ///   ddlforge validate --vendor oracle
    Validate {
        /// Target vendor (defaults to the configured vendor)
        #[arg(long, value_name = "VENDOR")]
        vendor: Option<Vendor>,

        /// Path to schema file
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,
    },

    /// Detect the vendor of a live database
    ///
    /// EXAMPLES:
    ///   ddlforge detect --env production
    ///   ddlforge detect --url postgres://localhost/shop
    Detect {
        /// Target environment
        #[arg(short, long, value_name = "ENV", default_value = "development")]
        env: String,

        /// Connection URL (overrides the environment)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },

    /// Apply the generated DDL to a live database
    ///
    /// Detects the vendor from the connection, generates the statements and
    /// runs them in a single transaction.
    ///
    /// EXAMPLES:
    ///   ddlforge apply --url sqlite://app.db
    ///   ddlforge apply --env staging --mode drop --dry-run
    Apply {
        /// Target environment
        #[arg(short, long, value_name = "ENV", default_value = "development")]
        env: String,

        /// Connection URL (overrides the environment)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Path to schema file
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Kind of statements to apply
        #[arg(short, long, value_enum, default_value = "create")]
        mode: DdlMode,

        /// Emit conditional DDL
        #[arg(long)]
        if_not_exists: bool,

        /// Dry run - show SQL without executing
        #[arg(long)]
        dry_run: bool,

        /// Timeout for acquiring a connection (in seconds)
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },
}
