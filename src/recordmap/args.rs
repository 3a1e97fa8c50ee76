use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recordmap")]
#[command(about = "Resolve declared attributes out of foreign JSON records", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding recordmap.json (defaults to ./.recordmap, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a record with a catalog type and print its resolved attributes
    #[command(alias = "r")]
    Resolve {
        /// Catalog document declaring the types
        #[arg(long)]
        catalog: PathBuf,

        /// Type to parse the record as
        #[arg(long = "type", short = 't')]
        type_name: String,

        /// Input JSON file (reads stdin when omitted or "-")
        input: Option<PathBuf>,

        /// Include the record's cache key as "_cache_key"
        #[arg(long)]
        key: bool,
    },

    /// Print the cache key of a record
    #[command(alias = "k")]
    Key {
        /// Input JSON file (reads stdin when omitted or "-")
        input: Option<PathBuf>,
    },

    /// List the attribute declarations of a catalog
    #[command(alias = "d")]
    Describe {
        /// Catalog document declaring the types
        #[arg(long)]
        catalog: PathBuf,

        /// Only describe this type
        #[arg(long = "type", short = 't')]
        type_name: Option<String>,
    },
}
