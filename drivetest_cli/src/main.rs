extern crate env_logger;

pub mod options;

use clap::Parser;
use drivetest::configuration::CATALOG_SIZE;
use drivetest::{build_archive, BatchDriver, Configuration, DataStore, Extractor};
use options::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    use env_logger::Env;
    let env = Env::default()
        .filter_or(
            "RUST_LOG",
            if cli.verbose {
                "info,drivetest=debug"
            } else {
                "info"
            },
        )
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::init_from_env(env);

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> drivetest::Result<()> {
    let command = cli.command.unwrap_or(Commands::RUN {
        start: None,
        end: CATALOG_SIZE,
    });

    let headed = cli.headed || matches!(command, Commands::DEBUG { .. });

    let mut config = match cli.config {
        Some(ref path) => {
            log::info!("Loading configuration from {}", path.display());
            Configuration::load(path).await?
        }
        None => Configuration::new(),
    };

    let mut webdriver = config.webdriver.clone();
    if let Some(webdriver_url) = cli.webdriver_url {
        webdriver = webdriver.with_server_url(webdriver_url);
    }
    if headed {
        webdriver = webdriver.with_headless(false);
    }
    config.with_webdriver(webdriver);

    if let Some(data_dir) = cli.data_dir {
        config.with_data_dir(data_dir);
    }
    if let Some(retries) = cli.retries {
        config.with_retries(retries);
    }
    if let Some(resume_policy) = cli.resume_policy {
        config.with_resume_policy(resume_policy);
    }

    let config = config.build();

    let (start, end) = match command {
        Commands::ARCHIVE => {
            let store = DataStore::new(&config.data_dir);
            store.ensure_dirs().await?;
            build_archive(&store, config.catalog_size).await?;
            return Ok(());
        }
        Commands::RUN { start, end } => (start, end),
        Commands::RESUME { from, end } => (Some(from), end),
        Commands::DEBUG { start, end } => {
            log::info!("Debug run over Test {} to Test {}", start, end);
            (Some(start), end)
        }
    };

    let extractor = Extractor::webdriver(&config)?;
    let mut driver = BatchDriver::new(extractor, &config);

    let result = driver.run(start, end).await;
    driver.harvester_mut().shutdown().await;

    let report = result?;

    if !report.skipped.is_empty() {
        log::warn!(
            "{} tests were skipped, run again to retry them",
            report.skipped.len()
        );
    }

    Ok(())
}
