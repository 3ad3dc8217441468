use clap::Parser;
use pagecraft::cli::{self, Cli};
use pagecraft::config::Settings;
use tracing::{debug, Level};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;

    // Initialize tracing; stdout is reserved for command output
    let level = settings.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    debug!(config = %cli.config.display(), "Settings loaded");

    let output = cli::run(&cli.command, &settings)?;
    println!("{}", output.body);

    if !output.success {
        std::process::exit(1);
    }
    Ok(())
}
