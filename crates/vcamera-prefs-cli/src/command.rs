use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use vcamera_prefs::{PrefKind, PrefValue};

use crate::{config::CONFIG_DIR_ENV, render::Output};

#[derive(Parser, Clone)]
#[command(name = "vcprefs", version, about = "VCamera settings CLI", long_about = None)]
pub struct Cli {
    // Optional as a workaround for https://github.com/clap-rs/clap/issues/3572
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short = 'o', long, global = true, value_enum, default_value_t = Output::Plain)]
    pub output: Output,

    #[arg(
        long,
        global = true,
        env = CONFIG_DIR_ENV,
        help = "Directory holding the settings database. Defaults to the platform config directory."
    )]
    pub config_dir: Option<PathBuf>,

    #[arg(
        short = 'q',
        long,
        global = true,
        help = "Don't return anything to stdout."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    #[command(long_about = "Print the value stored under a key.")]
    Get {
        key: String,

        #[arg(short = 't', long = "type", value_enum, help = "Only accept values of this type.")]
        kind: Option<ValueType>,

        #[arg(
            long,
            requires = "kind",
            help = "Printed when the key is missing or holds another type."
        )]
        default: Option<String>,
    },

    #[command(long_about = "Store a value under a key, replacing any previous value.")]
    Set {
        key: String,
        value: String,

        #[arg(short = 't', long = "type", value_enum, default_value_t = ValueType::String)]
        kind: ValueType,
    },

    #[command(long_about = "Delete a key. Deleting a missing key is not an error.")]
    Remove { key: String },

    #[command(long_about = "Delete every camera setting.")]
    Clear,

    #[command(long_about = "List all keys.")]
    Keys,

    #[command(long_about = "Print every key with its type and value.")]
    Dump,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum ValueType {
    String,
    Int,
    Long,
    Bool,
    Float,
}

impl ValueType {
    pub fn kind(self) -> PrefKind {
        match self {
            ValueType::String => PrefKind::String,
            ValueType::Int => PrefKind::Int,
            ValueType::Long => PrefKind::Long,
            ValueType::Bool => PrefKind::Boolean,
            ValueType::Float => PrefKind::Float,
        }
    }

    /// Parse a command line argument as a value of this type.
    pub fn parse(self, raw: &str) -> Result<PrefValue> {
        let value = match self {
            ValueType::String => PrefValue::String(raw.to_owned()),
            ValueType::Int => PrefValue::Int(raw.parse().wrap_err("Expected a 32-bit integer")?),
            ValueType::Long => PrefValue::Long(raw.parse().wrap_err("Expected a 64-bit integer")?),
            ValueType::Bool => PrefValue::Boolean(raw.parse().wrap_err("Expected true or false")?),
            ValueType::Float => PrefValue::Float(raw.parse().wrap_err("Expected a number")?),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        assert_eq!(ValueType::Int.parse("3").unwrap(), PrefValue::Int(3));
        assert_eq!(
            ValueType::Long.parse("9000000000").unwrap(),
            PrefValue::Long(9_000_000_000)
        );
        assert_eq!(ValueType::Bool.parse("true").unwrap(), PrefValue::Boolean(true));
        assert_eq!(ValueType::Float.parse("0.5").unwrap(), PrefValue::Float(0.5));
        assert_eq!(
            ValueType::String.parse("Pixel").unwrap(),
            PrefValue::from("Pixel")
        );

        assert!(ValueType::Int.parse("9000000000").is_err());
        assert!(ValueType::Bool.parse("yes").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
