use std::path::PathBuf;

use clap::{Parser, Subcommand};

use docroute::{BackendId, Options};

#[derive(Parser, Debug)]
#[command(
    name = "docroute",
    about = "Route documents to the right analysis back-end",
    version
)]
pub struct Cli {
    /// Config file [default: ./.docroute/config.toml, fallback ~/.config/docroute/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "terminal", value_name = "FORMAT", global = true)]
    pub format: OutputFormat,

    /// Log routing and activation decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which back-end a file routes to, without analyzing it
    Detect {
        file: PathBuf,

        /// Force a back-end (xml, docling, document, data)
        #[arg(long)]
        hint: Option<String>,
    },

    /// Analyze a file with its routed back-end
    Analyze {
        file: PathBuf,

        #[arg(long)]
        hint: Option<String>,

        /// Back-end option, `key=value` (repeatable; JSON values are parsed)
        #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
        options: Vec<(String, serde_json::Value)>,
    },

    /// Chunk a file using a previously saved analysis result
    Chunk {
        file: PathBuf,

        /// JSON file holding the output of `analyze`
        #[arg(long, value_name = "FILE")]
        result: PathBuf,

        /// Chunking strategy [default: from config, else "auto"]
        #[arg(long)]
        strategy: Option<String>,

        #[arg(long)]
        hint: Option<String>,

        #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
        options: Vec<(String, serde_json::Value)>,
    },

    /// List every back-end and whether it is installed
    Backends,

    /// List supported file suffixes
    Extensions {
        /// Only this back-end
        #[arg(long)]
        backend: Option<BackendArg>,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum BackendArg {
    Xml,
    Docling,
    Document,
    Data,
}

impl From<&BackendArg> for BackendId {
    fn from(arg: &BackendArg) -> Self {
        match arg {
            BackendArg::Xml => BackendId::Xml,
            BackendArg::Docling => BackendId::Docling,
            BackendArg::Document => BackendId::Document,
            BackendArg::Data => BackendId::Data,
        }
    }
}

/// Parse `key=value`. The value is taken as JSON when it parses, otherwise
/// as a plain string.
fn parse_option(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty option key in `{raw}`"));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn collect_options(pairs: Vec<(String, serde_json::Value)>) -> Options {
    pairs.into_iter().collect()
}
