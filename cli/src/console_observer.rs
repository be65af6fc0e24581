use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::mpsc;
use snake_arcade_engine::games::MatchObserver;
use snake_arcade_engine::games::snake::{
    Consumables, CueEvent, GameOverNotification, GamePhase, MatchSnapshot, Position,
};
use snake_arcade_engine::{debug_log, log};

/// What the runner needs to hear back from a match.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    State(MatchSnapshot),
    GameOver(GameOverNotification),
    ReturnedToMenu(String),
}

/// Logs the match to the console and forwards it to the runner.
#[derive(Clone)]
pub struct ConsoleObserver {
    events_tx: mpsc::UnboundedSender<ObservedEvent>,
    render_frames: bool,
    last_score: Arc<AtomicU32>,
}

impl ConsoleObserver {
    pub fn new(events_tx: mpsc::UnboundedSender<ObservedEvent>, render_frames: bool) -> Self {
        Self {
            events_tx,
            render_frames,
            last_score: Arc::new(AtomicU32::new(0)),
        }
    }

    fn forward(&self, event: ObservedEvent) {
        // The runner may already be gone on shutdown.
        let _ = self.events_tx.send(event);
    }
}

impl MatchObserver for ConsoleObserver {
    async fn broadcast_state(&self, snapshot: MatchSnapshot) {
        match snapshot.phase {
            GamePhase::Setup if !snapshot.message.is_empty() => log!("{}", snapshot.message),
            GamePhase::InProgress => {
                let previous = self.last_score.swap(snapshot.score, Ordering::Relaxed);
                if snapshot.score > previous {
                    log!("Score {}", snapshot.score);
                }
            }
            GamePhase::Setup => self.last_score.store(0, Ordering::Relaxed),
            _ => {}
        }
        if self.render_frames {
            debug_log!(
                "tick {} score {} {}\n{}",
                snapshot.tick,
                snapshot.score,
                snapshot.message,
                render(&snapshot)
            );
        }
        self.forward(ObservedEvent::State(snapshot));
    }

    async fn broadcast_game_over(&self, notification: GameOverNotification) {
        let player = notification
            .player
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        log!(
            "{} [{}] {} Score {} after {} ticks{}",
            player,
            notification.mode,
            notification.message,
            notification.score,
            notification.ticks,
            if notification.is_new_high_score { ", new high score!" } else { "" }
        );
        self.forward(ObservedEvent::GameOver(notification));
    }

    fn play_cue(&self, cue: CueEvent) {
        debug_log!("cue {:?}", cue);
    }

    fn return_to_menu(&self, reason: &str) {
        log!("Back to menu: {}", reason);
        self.forward(ObservedEvent::ReturnedToMenu(reason.to_string()));
    }
}

/// Text frame of the board: `@` head, `o` body, `*` pellet, `P` parcel, `X` drop-off.
pub fn render(snapshot: &MatchSnapshot) -> String {
    let width = snapshot.field_size.width;
    let height = snapshot.field_size.height;
    let mut grid = vec![vec!['.'; width]; height];

    let mut put = |pos: Option<Position>, ch: char| {
        if let Some(pos) = pos
            && snapshot.field_size.contains(pos)
        {
            grid[pos.row as usize][pos.col as usize] = ch;
        }
    };

    match &snapshot.consumables {
        Consumables::Pellet { pellet } => put(*pellet, '*'),
        Consumables::Delivery { parcel, delivery_point, .. } => {
            put(*parcel, 'P');
            put(*delivery_point, 'X');
        }
    }
    for pos in snapshot.snake.iter().skip(1) {
        put(Some(*pos), 'o');
    }
    put(snapshot.head(), '@');

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_arcade_engine::games::snake::{Direction, EndReason, FieldSize, GameMode};
    use snake_arcade_engine::PlayerId;

    fn snapshot() -> MatchSnapshot {
        MatchSnapshot {
            mode: GameMode::Delivery,
            phase: GamePhase::InProgress,
            tick: 4,
            score: 1,
            high_score: None,
            time_left: None,
            message: String::new(),
            field_size: FieldSize::new(5, 3),
            snake: vec![Position::new(1, 2), Position::new(1, 1)],
            heading: Direction::Right,
            consumables: Consumables::Delivery {
                parcel: Some(Position::new(0, 4)),
                delivery_point: Some(Position::new(2, 0)),
                carrying_parcel: false,
            },
            combo: None,
            end_reason: None,
        }
    }

    #[test]
    fn test_render_marks_every_entity() {
        assert_eq!(render(&snapshot()), "....P\n.o@..\nX....");
    }

    #[tokio::test]
    async fn test_events_are_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let observer = ConsoleObserver::new(tx, false);

        observer.broadcast_state(snapshot()).await;
        observer.return_to_menu("no player name stored");
        observer
            .broadcast_game_over(GameOverNotification {
                mode: GameMode::Delivery,
                player: Some(PlayerId::new("courier".to_string())),
                score: 1,
                previous_best: None,
                is_new_high_score: true,
                reason: EndReason::OutOfBounds,
                message: "Game over!".to_string(),
                ticks: 9,
            })
            .await;

        assert_eq!(rx.recv().await, Some(ObservedEvent::State(snapshot())));
        assert_eq!(
            rx.recv().await,
            Some(ObservedEvent::ReturnedToMenu("no player name stored".to_string()))
        );
        assert!(matches!(rx.recv().await, Some(ObservedEvent::GameOver(n)) if n.score == 1));
    }

    #[tokio::test]
    async fn test_closed_runner_is_not_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let observer = ConsoleObserver::new(tx, true);
        observer.broadcast_state(snapshot()).await;
        observer.play_cue(CueEvent::PelletConsumed);
    }
}
