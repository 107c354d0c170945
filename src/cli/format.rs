use clap::ValueEnum;

/// How query results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Matching lines, one per line
    Text,
    /// One JSON document for the whole batch
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Apply this mode to the `colored` crate's global switch
    pub fn apply(self) {
        match self {
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
            // let the terminal decide
            ColorMode::Auto => {}
        }
    }
}
