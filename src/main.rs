use clap::Parser;
use talent_match::cli::{self, Cli};
use talent_match::config::Settings;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(settings: &Settings, verbose: bool) {
    // Environment wins over the [logging] section
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if verbose {
            "debug".to_string()
        } else {
            settings.logging.level.clone()
        }
    });
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    init_logging(&settings, cli.verbose);
    info!("Configuration loaded (working dir: {})", settings.paths.working_dir.display());

    let output = cli::run(&cli.command, &settings).and_then(|value| Ok(serde_json::to_string_pretty(&value)?));
    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
