use clap::Parser;
use vlang::driver::{Config, Driver};

fn main() {
    let config = Config::parse();

    let default_level = if config.verbose {
        "debug"
    } else if config.timed {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let driver = Driver::new(config);
    if let Err(err) = driver.run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
