use std::error::Error;

use clap::Parser;
use dailygrid::{
    config::{load_dotenv, Config, RunMode, DEFAULT_OUTPUT_DIR},
    updater,
};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,

    /// Clean the development artifact, same as setting DEV_RUN=true
    #[arg(long)]
    dev: bool,

    /// Directory for the output files, defaults to DAILYGRID_OUTPUT_DIR or data/
    #[arg(short, long)]
    output_dir: Option<String>,
}

/// Delete the daily energy mix artifact, if there is one
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
    let output_dir = args
        .output_dir
        .or_else(|| std::env::var("DAILYGRID_OUTPUT_DIR").ok())
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    match updater::clean(&Config::new(mode, output_dir)) {
        Ok(removed) => {
            info!("Clean done, artifact removed: {}", removed);
            Ok(())
        }
        Err(e) => {
            error!("{} {}", e.kind(), e);
            Err(e.into())
        }
    }
}
