use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile CSV columns, relate values, and rewrite rows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every column and report its metadata
    Inspect(InspectArgs),
    /// Show which values of one column co-occur with values of another
    Relate(RelateArgs),
    /// Select rows matching predicates such as `Year>=2000`
    Filter(FilterArgs),
    /// Replace a value in selected columns of matching rows
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "encoding")]
    pub encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Restrict the report to these columns
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Emit the metadata as JSON
    #[arg(long, conflicts_with = "summary")]
    pub json: bool,
    /// Emit a one-line-per-column summary table
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Args)]
pub struct RelateArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Source column holding the categorical values
    #[arg(short = 'c', long = "column")]
    pub column: String,
    /// Column whose co-occurring values are collected
    #[arg(short = 'r', long = "related")]
    pub related: String,
    /// Single categorical value to relate (all values when omitted)
    #[arg(long = "value")]
    pub value: Option<String>,
    /// List the related values under each relation
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Row predicates such as `Model=Camry` or `Miles<100000` (all must hold)
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
    /// Output CSV file (a table is printed to stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Report width in characters (defaults to the terminal width)
    #[arg(long)]
    pub width: Option<usize>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Value to replace; numeric values match regardless of `$` or `,` formatting
    #[arg(long = "old", allow_hyphen_values = true)]
    pub old: String,
    /// Replacement written verbatim into matching fields
    #[arg(long = "new", allow_hyphen_values = true)]
    pub new: String,
    /// Columns in which to replace the value
    #[arg(short = 'C', long = "columns", value_delimiter = ',', required = true)]
    pub columns: Vec<String>,
    /// Only rewrite rows matching these predicates
    #[arg(long = "where", action = clap::ArgAction::Append)]
    pub predicates: Vec<String>,
    /// Destination CSV file (the input is rewritten in place if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
