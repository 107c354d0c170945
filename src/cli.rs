mod format;

use clap::{ArgAction, Parser};
pub use format::{ColorMode, OutputFormat};
use std::ffi::OsString;
use std::path::PathBuf;

const QUERY_HELP: &str = "\
Query examples:
  method = POST
  status ~ 50?
  size >= 60000000
  user_agent ~ *Version/6.0\\ Mobile* and ip = 66.249.73.135
  (METHOD = post or url ~ *admin*) & (ip > 91.0.0.0 | referrer ~ *://*)

Fields:     ip, datetime, method, url, version, status, size, referrer, user_agent
Operators:  = (equal, case-insensitive), ~ (glob match), >, >=, <
Connectives: and (or &), or (or |); no precedence, evaluated left to right,
             use parentheses to group
Escape:     a backslash keeps the following space inside a value";

/// Filter web-server access logs with boolean field queries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = QUERY_HELP)]
pub struct Cli {
    /// Access log to search
    pub log_path: PathBuf,

    /// Queries to run; each one scans the whole log
    #[arg(required = true, value_name = "QUERY")]
    pub queries: Vec<String>,

    /// TOML configuration file
    #[arg(long, env = "ACCESS_LOG_QUERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the output to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// When to colorize messages
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print a frequency summary of each query's matches
    #[arg(long)]
    pub summary: bool,

    /// Print the number of matching lines instead of the lines
    #[arg(short, long)]
    pub count: bool,
}

impl Cli {
    /// Default log filter for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn cli_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}

pub fn cli_parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
