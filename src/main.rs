use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    process,
};

use clap::Parser;
use log::{error, info};

use ideaboard::{App, Cli, Commands, Config, ConsoleNotifier, IdeaStore, Result};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let (input, interactive): (Box<dyn BufRead>, bool) = match &cli.script {
        Some(path) => (Box::new(BufReader::new(File::open(path)?)), false),
        None => (Box::new(BufReader::new(io::stdin())), console::user_attended()),
    };

    // The store lives exactly as long as this session
    let mut app = App::new(IdeaStore::new(), config, input, Box::new(ConsoleNotifier))
        .with_config_path(cli.config.clone())
        .assume_yes(cli.yes)
        .show_prompt(interactive);

    if let Some(file) = cli.import {
        app.run(Commands::Import { file, force: true })?;
    }

    app.run_session()
}

fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    info!("Application shutting down");
}
