use crate::options::sub_command::Commands;
use clap::Parser;
use drivetest::ResumePolicy;
use std::path::PathBuf;

/// program to harvest the driving-exam practice test catalog.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Build main sub commands
    #[clap(subcommand)]
    pub command: Option<Commands>,
    /// JSON configuration file. Flags given on the command line take precedence.
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the tests, images and progress cursor [default: scraped_data]
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// The WebDriver server url [default: http://localhost:9515]
    #[clap(long, global = true)]
    pub webdriver_url: Option<String>,
    /// Extraction attempts per test [default: 3]
    #[clap(long, global = true)]
    pub retries: Option<usize>,
    /// Show the browser window.
    #[clap(long, global = true)]
    pub headed: bool,
    /// Where a run without --start begins: latest-record or first-gap [default: latest-record]
    #[clap(long, global = true)]
    pub resume_policy: Option<ResumePolicy>,
    /// Print debug output.
    #[clap(short, long, global = true)]
    pub verbose: bool,
}
