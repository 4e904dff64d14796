mod cli;
pub mod settings;

use clap::Parser;
use settings::Settings;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let settings = Settings::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(base_dir = %settings.base_dir.display(), "signrec starting");

    cli::run(cli, settings)
}
