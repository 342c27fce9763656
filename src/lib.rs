pub mod cli;
pub mod column;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod io_utils;
pub mod predicate;
pub mod relation;
pub mod scan;
pub mod table;
pub mod update;
pub mod value;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands, InputArgs},
    column::ColumnMetadata,
    io_utils::ScanOptions,
};

pub use crate::{
    dataset::DataFile,
    error::Error,
    predicate::{Comparator, Predicate, parse_predicate},
    update::UpdateRequest,
    value::Value,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_inspect", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect(args) => handle_inspect(&args),
        Commands::Relate(args) => handle_relate(&args),
        Commands::Filter(args) => handle_filter(&args),
        Commands::Update(args) => handle_update(&args),
    }
}

fn open_dataset(args: &InputArgs) -> Result<DataFile> {
    let options = ScanOptions::resolve(&args.input, args.delimiter, args.encoding.as_deref())?;
    let data = DataFile::open_with(&args.input, options)
        .with_context(|| format!("Scanning {:?}", args.input))?;
    debug!(
        "Opened '{}' with delimiter '{}' and encoding {}",
        data.path().display(),
        printable_delimiter(data.options().delimiter),
        data.options().encoding.name()
    );
    Ok(data)
}

#[derive(Serialize)]
struct InspectReport<'a> {
    path: &'a Path,
    row_count: usize,
    column_count: usize,
    columns: Vec<&'a ColumnMetadata>,
}

fn handle_inspect(args: &cli::InspectArgs) -> Result<()> {
    let data = open_dataset(&args.input)?;
    if args.json {
        let columns = if args.columns.is_empty() {
            data.columns().iter().collect()
        } else {
            args.columns
                .iter()
                .map(|name| data.column(name))
                .collect::<Result<Vec<_>, _>>()?
        };
        let report = InspectReport {
            path: data.path(),
            row_count: data.row_count(),
            column_count: data.column_count(),
            columns,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Serializing metadata")?
        );
    } else if args.summary {
        let headers = ["#", "name", "datatype", "categorical", "numeric"]
            .map(String::from)
            .to_vec();
        let rows = data
            .columns()
            .iter()
            .map(|column| {
                vec![
                    column.number.to_string(),
                    column.name.clone(),
                    column
                        .datatype
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                    column.categorical_values.len().to_string(),
                    column.numeric_count.to_string(),
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    } else if args.columns.is_empty() {
        println!("{data}");
    } else {
        println!("{}", data.metadata_report(&args.columns).trim_start());
    }
    info!(
        "Inspected {} row(s) across {} column(s) in {:?}",
        data.row_count(),
        data.column_count(),
        data.path()
    );
    Ok(())
}

fn handle_relate(args: &cli::RelateArgs) -> Result<()> {
    let mut data = open_dataset(&args.input)?;
    let render = |relation: &relation::Relation| {
        if args.verbose {
            format!("{relation:#}")
        } else {
            relation.to_string()
        }
    };
    match &args.value {
        Some(value) => {
            let relation = data
                .relationship(value, &args.column, &args.related)
                .with_context(|| format!("Relating '{value}' in '{}'", args.column))?;
            println!("{}", render(relation));
        }
        None => {
            let relations = data
                .relationships(&args.column, &args.related)
                .with_context(|| format!("Relating '{}' to '{}'", args.column, args.related))?;
            for (_, relation) in relations.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
                println!("{}", render(relation));
            }
        }
    }
    Ok(())
}

fn handle_filter(args: &cli::FilterArgs) -> Result<()> {
    let data = open_dataset(&args.input)?;
    let predicates = predicate::parse_predicates(&args.filters)?;
    debug!("Filters: {}", predicates.iter().join(" AND "));
    match &args.output {
        Some(output) => {
            let written = data
                .filter_to_file(&predicates, output)
                .with_context(|| format!("Writing filtered rows to {output:?}"))?;
            info!("{written} row(s) matched");
        }
        None => {
            let rows = data.filter(&predicates)?;
            let width = args.width.unwrap_or_else(table::terminal_width);
            print!("{}", rows.render(width));
            info!("{} row(s) matched", rows.len());
        }
    }
    Ok(())
}

fn handle_update(args: &cli::UpdateArgs) -> Result<()> {
    let mut data = open_dataset(&args.input)?;
    let mut request = UpdateRequest::new(
        Value::classify(&args.old),
        Value::Text(args.new.clone()),
        args.columns.iter().map(|c| c.trim().to_string()),
    );
    for predicate in predicate::parse_predicates(&args.predicates)? {
        request = request.with_predicate(predicate);
    }
    let replaced = data
        .update(&request, args.output.as_deref())
        .with_context(|| format!("Updating {:?}", args.input.input))?;
    info!(
        "Replaced {replaced} occurrence(s) of '{}' in {}",
        args.old,
        args.columns.join(", ")
    );
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
