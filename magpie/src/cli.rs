use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Path to the delimited metadata export.
    #[clap(long, default_value = "wholedb.csv")]
    pub db: PathBuf,
    /// Root directory holding the media files.
    #[clap(long, default_value = "imgs")]
    pub storage: PathBuf,
    /// Print matching records as JSON lines instead of caption text.
    #[clap(long, default_value = "false")]
    pub json: bool,
}
