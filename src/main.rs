use std::error::Error;

use clap::Parser;
use hidbridge::cli::{main_cli, Args};

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", "info");
    env_logger::Builder::from_env(env).init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::debug!("Starting hidbridge v{}", VERSION);

    let args = Args::parse();
    main_cli(args)
}
