mod classifier;
mod cli;
mod db;
mod error;
mod features;
mod fmt;
mod importer;
mod linker;
mod models;
mod reports;
mod roster;
mod settings;
mod sink;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{resolve_settings, Cli, Commands};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camara=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli);

    let result = match cli.command {
        Commands::Init { save } => cli::init::run(&settings, save),
        Commands::Fetch => cli::fetch::run(&settings),
        Commands::Load { file, link, year } => cli::load::run(&settings, &file, link, year),
        Commands::Train { file } => cli::train::run(&settings, &file),
        Commands::Run {
            file,
            link,
            skip_fetch,
            year,
        } => cli::run::run(&settings, file.as_deref(), link, skip_fetch, year),
        Commands::Status => cli::status::run(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
