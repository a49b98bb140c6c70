use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{BufReader, stdin, stdout};
use twenty48_core::GameSession;
use twenty48_play::{Controller, ScoreClient};

/// Play 2048 in the terminal and submit scores to a score server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Base URL of the score server
    #[arg(long, default_value = "http://127.0.0.1:3001")]
    server: String,

    /// Name to submit scores under (can be changed in game with `name`)
    #[arg(long)]
    name: Option<String>,

    /// Seed for tile spawns, for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = GameSession::new(&mut rng);
    if let Some(name) = cli.name {
        session.set_name(name);
    }

    info!("using score server at {}", cli.server);
    let client = ScoreClient::new(cli.server);
    let (controller, events) = Controller::new(session, rng, client);
    controller
        .run(BufReader::new(stdin()), stdout(), events)
        .await?;
    Ok(())
}
