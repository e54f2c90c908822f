use clap::Subcommand;
use drivetest::configuration::CATALOG_SIZE;

#[derive(Subcommand)]
pub enum Commands {
    /// extract a range of tests, resuming from disk when no start is given.
    RUN {
        /// first test to extract
        #[clap(short, long)]
        start: Option<u32>,
        /// last test to extract
        #[clap(short, long, default_value_t = CATALOG_SIZE)]
        end: u32,
    },
    /// resume the catalog from a specific test.
    RESUME {
        /// test to resume from
        #[clap(short, long)]
        from: u32,
        /// last test to extract
        #[clap(short, long, default_value_t = CATALOG_SIZE)]
        end: u32,
    },
    /// extract a small range with a visible browser window.
    DEBUG {
        /// first test to extract
        #[clap(short, long, default_value_t = 27)]
        start: u32,
        /// last test to extract
        #[clap(short, long, default_value_t = 30)]
        end: u32,
    },
    /// rebuild all_tests.json from the stored tests.
    ARCHIVE,
}
