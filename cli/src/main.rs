mod autopilot;
mod config;
mod console_observer;
mod runner;

use clap::{Parser, ValueEnum};
use snake_arcade_engine::games::snake::{GameMode, MatchSettings};
use snake_arcade_engine::highscore::YamlHighScoreStore;
use snake_arcade_engine::{log, logger, PlayerId};

use config::get_config_manager;
use runner::{leaderboard_lines, run_games, RunOptions};

const LEADERBOARD_SIZE: usize = 5;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Blitz,
    Delivery,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Blitz => GameMode::Blitz,
            ModeArg::Delivery => GameMode::Delivery,
        }
    }
}

#[derive(Parser)]
#[command(name = "snake_arcade")]
struct Args {
    #[arg(long, value_enum, default_value_t = ModeArg::Blitz)]
    mode: ModeArg,

    /// Config file; created with defaults on first run.
    #[arg(long)]
    config: Option<String>,

    /// Overrides the stored player name.
    #[arg(long)]
    player: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 1)]
    games: u32,

    #[arg(long)]
    use_log_prefix: bool,

    /// Debug logging, including a text frame per state update.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Arcade".to_string())
    } else {
        None
    };
    logger::init_logger(prefix, args.verbose);

    let config = get_config_manager(args.config.as_deref()).get_or_create_default()?;
    let mode = GameMode::from(args.mode);

    let player = match args.player.as_deref() {
        Some(name) => PlayerId::parse(name),
        None => config.player(),
    };
    let store = YamlHighScoreStore::from_file(&config.high_score_file);

    let options = RunOptions {
        mode,
        settings: MatchSettings::from(config.mode_config(mode)),
        player,
        seed: args.seed,
        games: args.games,
        render_frames: args.verbose,
    };

    let results = run_games(options, store).await?;
    let best = results.iter().map(|n| n.score).max().unwrap_or(0);
    log!("[{}] {} game(s) finished, best score {}", mode, results.len(), best);

    match YamlHighScoreStore::from_file(&config.high_score_file).load_table() {
        Ok(table) => {
            for line in leaderboard_lines(&table, mode, LEADERBOARD_SIZE) {
                log!("{}", line);
            }
        }
        Err(e) => log!("Could not read high scores: {}", e),
    }

    Ok(())
}
