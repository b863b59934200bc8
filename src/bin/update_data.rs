use std::error::Error;

use clap::Parser;
use dailygrid::{
    config::{load_dotenv, Config, RunMode},
    updater::Updater,
};
use jiff::Zoned;
use log::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Development run, same as setting DEV_RUN=true
    #[arg(long)]
    dev: bool,

    /// Directory for the output files, defaults to DAILYGRID_OUTPUT_DIR or data/
    #[arg(short, long)]
    output_dir: Option<String>,
}

/// Run this job once a day, after EIA publishes the previous day
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    load_dotenv(&args.env);

    let mode = if args.dev {
        RunMode::Development
    } else {
        RunMode::from_env()
    };
    if mode == RunMode::Development {
        info!("This is a dev run");
    }

    let result = Config::from_env(mode)
        .map(|mut config| {
            if let Some(dir) = &args.output_dir {
                config.output_dir = dir.into();
            }
            config
        })
        .and_then(|config| Updater::from_config(&config))
        .and_then(|updater| updater.run(&Zoned::now()));
    match result {
        Ok(snapshot) => {
            info!("Updated daily energy mix for {} regions", snapshot.len());
            Ok(())
        }
        Err(e) => {
            error!("{} {}", e.kind(), e);
            Err(e.into())
        }
    }
}
