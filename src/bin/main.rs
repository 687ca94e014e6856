//! ermap CLI - compile ER schemas to relational layouts
//!
//! Usage:
//!   ermap compile <schema.json> <groupings.json> [--out-dir <dir>] [--config <file>] [--dialect <dialect>]
//!   ermap queries <graph.json> <tables.json> [--config <file>] [--dialect <dialect>] [--node <name>]
//!   ermap ddl <tables.json> [--config <file>] [--dialect <dialect>]
//!
//! Examples:
//!   ermap compile university.json layout.json --out-dir out/
//!   ermap queries out/graph.json out/tables.json --node instructor
//!   ermap ddl out/tables.json --dialect duckdb

use clap::{Parser, Subcommand, ValueEnum};
use ermap::compile::{compile_json, load, CompileError, CompileOptions, CompileOutput};
use ermap::config::Settings;
use ermap::reconstruct::{reconstruct_node, render};
use ermap::sql::Dialect;
use ermap::synth::PhysicalSchema;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ermap")]
#[command(about = "ermap - compile ER schemas to relational layouts and reconstruct them as SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify, synthesize and resolve; write graph.json, tables.json and schema.sql
    Compile {
        /// Entity/relationship records (JSON)
        schema: PathBuf,

        /// Ordered list of groupings (JSON array of arrays of node names)
        groupings: PathBuf,

        /// Directory the outputs are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Settings file (defaults to $ERMAP_CONFIG, then ./ermap.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// SQL dialect, overriding the settings file
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Print reconstruction queries from persisted compile output
    Queries {
        /// graph.json written by `compile`
        graph: PathBuf,

        /// tables.json written by `compile`
        tables: PathBuf,

        /// Settings file (defaults to $ERMAP_CONFIG, then ./ermap.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// SQL dialect, overriding the settings file
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Only this entity or relationship
        #[arg(short, long)]
        node: Option<String>,
    },

    /// Print CREATE TYPE / CREATE TABLE statements for tables.json
    Ddl {
        /// tables.json written by `compile`
        tables: PathBuf,

        /// Settings file (defaults to $ERMAP_CONFIG, then ./ermap.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// SQL dialect, overriding the settings file
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            schema,
            groupings,
            out_dir,
            config,
            dialect,
        } => cmd_compile(&schema, &groupings, &out_dir, config.as_deref(), dialect),
        Commands::Queries {
            graph,
            tables,
            config,
            dialect,
            node,
        } => cmd_queries(&graph, &tables, config.as_deref(), dialect, node.as_deref()),
        Commands::Ddl {
            tables,
            config,
            dialect,
        } => cmd_ddl(&tables, config.as_deref(), dialect),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn options(
    config: Option<&Path>,
    dialect: Option<DialectArg>,
) -> Result<CompileOptions, CompileError> {
    let settings = match config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    let options = CompileOptions::from_settings(&settings);
    Ok(match dialect {
        Some(d) => options.with_dialect(d.into()),
        None => options,
    })
}

fn cmd_compile(
    schema: &Path,
    groupings: &Path,
    out_dir: &Path,
    config: Option<&Path>,
    dialect: Option<DialectArg>,
) -> Result<(), CompileError> {
    let options = options(config, dialect)?;
    let output = compile_json(
        &fs::read_to_string(schema)?,
        &fs::read_to_string(groupings)?,
        &options,
    )?;

    // Fail before writing anything if a node cannot be reconstructed.
    output.queries()?;

    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join("graph.json"), output.compiled.to_json()?)?;
    fs::write(out_dir.join("tables.json"), output.schema.to_json()?)?;
    fs::write(out_dir.join("schema.sql"), output.ddl())?;

    println!(
        "Wrote {} tables and {} types to {}",
        output.schema.tables.len(),
        output.schema.types.len(),
        out_dir.display()
    );
    Ok(())
}

fn cmd_queries(
    graph: &Path,
    tables: &Path,
    config: Option<&Path>,
    dialect: Option<DialectArg>,
    node: Option<&str>,
) -> Result<(), CompileError> {
    let options = options(config, dialect)?;
    let output: CompileOutput = load(
        &fs::read_to_string(graph)?,
        &fs::read_to_string(tables)?,
        &options,
    )?;

    match node {
        Some(name) => {
            let query = reconstruct_node(&output.compiled, &output.schema, name)?;
            println!("{};", render(&query, output.dialect, output.validate_sql)?);
        }
        None => {
            for (name, sql) in output.queries()? {
                println!("-- {}", name);
                println!("{};", sql);
                println!();
            }
        }
    }
    Ok(())
}

fn cmd_ddl(
    tables: &Path,
    config: Option<&Path>,
    dialect: Option<DialectArg>,
) -> Result<(), CompileError> {
    let options = options(config, dialect)?;
    let schema = PhysicalSchema::from_json(&fs::read_to_string(tables)?)?;
    print!("{}", schema.to_ddl(options.dialect));
    Ok(())
}
