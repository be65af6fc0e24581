use tokio::sync::mpsc;
use snake_arcade_engine::games::SessionRng;
use snake_arcade_engine::games::snake::{
    GameMode, GameOverNotification, GamePhase, GameSession, GameStateMachine, MatchCommand,
    MatchSettings,
};
use snake_arcade_engine::highscore::{HighScoreStore, HighScoreTable};
use snake_arcade_engine::{debug_log, log, PlayerId};

use crate::autopilot::Autopilot;
use crate::console_observer::{ConsoleObserver, ObservedEvent};

pub struct RunOptions {
    pub mode: GameMode,
    pub settings: MatchSettings,
    pub player: Option<PlayerId>,
    pub seed: Option<u64>,
    pub games: u32,
    pub render_frames: bool,
}

/// Plays `games` matches back to back with the autopilot at the keys.
///
/// Returns the game-over notification of every finished match, or an error
/// when the session refused to start one.
pub async fn run_games<S>(options: RunOptions, store: S) -> Result<Vec<GameOverNotification>, String>
where
    S: HighScoreStore + Send + Sync + 'static,
{
    let rng = match options.seed {
        Some(seed) => SessionRng::new(seed),
        None => SessionRng::from_random(),
    };
    log!("[{}] Playing {} game(s), seed {}", options.mode, options.games, rng.seed());

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let observer = ConsoleObserver::new(events_tx, options.render_frames);
    let machine = GameStateMachine::new(options.mode, options.settings, options.player, rng);
    let session = GameSession::new(machine, store, observer);
    let session_handle = tokio::spawn(session.run(command_rx));

    let mut results = Vec::new();
    let mut last_tick = None;
    let mut outcome = Ok(());

    if options.games > 0 {
        command_tx
            .send(MatchCommand::Start)
            .map_err(|_| "Session stopped before the first game".to_string())?;
    }

    while results.len() < options.games as usize {
        let Some(event) = events_rx.recv().await else {
            outcome = Err("Session ended unexpectedly".to_string());
            break;
        };

        match event {
            ObservedEvent::State(snapshot) => {
                if snapshot.phase != GamePhase::InProgress || last_tick == Some(snapshot.tick) {
                    continue;
                }
                last_tick = Some(snapshot.tick);
                if let Some(key) = Autopilot::key_for(&snapshot) {
                    debug_log!("Autopilot presses {}", key);
                    let _ = command_tx.send(MatchCommand::Key(key.to_string()));
                }
            }
            ObservedEvent::GameOver(notification) => {
                results.push(notification);
                last_tick = None;
                if results.len() < options.games as usize {
                    let _ = command_tx.send(MatchCommand::Start);
                }
            }
            ObservedEvent::ReturnedToMenu(reason) => {
                outcome = Err(reason);
                break;
            }
        }
    }

    drop(command_tx);
    session_handle
        .await
        .map_err(|e| format!("Session task failed: {}", e))?;

    outcome.map(|_| results)
}

/// `1. name score` lines for the best `limit` entries of `mode`.
pub fn leaderboard_lines(table: &HighScoreTable, mode: GameMode, limit: usize) -> Vec<String> {
    table
        .leaderboard(mode)
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(rank, entry)| format!("{}. {} {}", rank + 1, entry.player, entry.score))
        .collect()
}
