use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior};

use crate::games::MatchObserver;
use crate::highscore::HighScoreStore;
use crate::{debug_log, log};
use super::events::{GameOverNotification, MatchCommand, MatchEvent};
use super::state_machine::GameStateMachine;
use super::types::GamePhase;

const MATCH_TIMER_PERIOD: Duration = Duration::from_secs(1);

/// Drives a [`GameStateMachine`] in real time.
///
/// Everything runs on the task that calls [`GameSession::run`]: commands,
/// movement ticks, the match timer and combo decay are branches of a single
/// `select!`, so no two of them ever touch the match at once. The intervals
/// belong to the running match and are dropped with it. Store calls run on
/// the blocking pool.
pub struct GameSession<S, O>
where
    S: HighScoreStore + Send + Sync + 'static,
    O: MatchObserver,
{
    machine: GameStateMachine,
    store: Arc<S>,
    observer: O,
}

impl<S, O> GameSession<S, O>
where
    S: HighScoreStore + Send + Sync + 'static,
    O: MatchObserver,
{
    pub fn new(machine: GameStateMachine, store: S, observer: O) -> Self {
        Self {
            machine,
            store: Arc::new(store),
            observer,
        }
    }

    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    /// Serves start requests until the command channel closes.
    pub async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<MatchCommand>) -> Self {
        while let Some(command) = command_rx.recv().await {
            match command {
                MatchCommand::Start => {
                    if self.run_match(&mut command_rx).await.is_break() {
                        break;
                    }
                }
                other => {
                    let events = self.machine.handle_command(other);
                    self.dispatch(events).await;
                }
            }
        }
        log!("[{}] Command channel closed, session finished", self.machine.mode());
        self
    }

    /// One match from setup to game over. `Break` means the command channel
    /// closed while the match was running.
    pub async fn run_match(
        &mut self,
        command_rx: &mut mpsc::UnboundedReceiver<MatchCommand>,
    ) -> ControlFlow<()> {
        let best = self.load_high_score().await;
        let events = self.machine.begin_setup(best);
        let started = self.machine.phase() == GamePhase::Setup;
        self.dispatch(events).await;
        if !started {
            return ControlFlow::Continue(());
        }

        let step_duration = self.machine.settings().countdown_step;
        for step in self.machine.countdown() {
            let events = self.machine.show_countdown_step(step);
            self.dispatch(events).await;

            let wait = sleep(step_duration);
            tokio::pin!(wait);
            loop {
                tokio::select! {
                    _ = &mut wait => break,
                    command = command_rx.recv() => match command {
                        Some(command) => {
                            // Not InProgress yet, so the machine drops these.
                            let events = self.machine.handle_command(command);
                            self.dispatch(events).await;
                        }
                        None => return ControlFlow::Break(()),
                    },
                }
            }
        }

        let events = self.machine.enter_in_progress();
        self.dispatch(events).await;
        self.play(command_rx).await
    }

    async fn play(
        &mut self,
        command_rx: &mut mpsc::UnboundedReceiver<MatchCommand>,
    ) -> ControlFlow<()> {
        let tick_interval = self.machine.settings().tick_interval;
        let decay_interval = self.machine.settings().combo_decay_interval;

        let mut movement = repeating(tick_interval);
        let mut match_timer = self
            .machine
            .is_time_limited()
            .then(|| repeating(MATCH_TIMER_PERIOD));
        let mut decay: Option<Interval> = None;

        while self.machine.phase() != GamePhase::GameOver {
            match (self.machine.is_decaying(), decay.is_some()) {
                (true, false) => decay = Some(repeating(decay_interval)),
                (false, true) => decay = None,
                _ => {}
            }

            let was_paused = self.machine.phase() == GamePhase::Paused;
            let running = !was_paused;

            let events = tokio::select! {
                biased;
                command = command_rx.recv() => match command {
                    Some(command) => self.machine.handle_command(command),
                    None => return ControlFlow::Break(()),
                },
                _ = movement.tick(), if running => self.machine.movement_tick(),
                _ = tick_optional(&mut match_timer), if running => self.machine.timer_tick(),
                _ = tick_optional(&mut decay), if running => self.machine.decay_tick(),
            };
            self.dispatch(events).await;

            if was_paused && self.machine.phase() == GamePhase::InProgress {
                // Paused time does not count: restart every period from now.
                movement.reset();
                if let Some(timer) = match_timer.as_mut() {
                    timer.reset();
                }
                if let Some(decay) = decay.as_mut() {
                    decay.reset();
                }
            }
        }

        debug_log!("[{}] Match loop finished, timers dropped", self.machine.mode());
        ControlFlow::Continue(())
    }

    async fn dispatch(&mut self, events: Vec<MatchEvent>) {
        for event in events {
            match event {
                MatchEvent::State(snapshot) => self.observer.broadcast_state(snapshot).await,
                MatchEvent::Cue(cue) => self.observer.play_cue(cue),
                MatchEvent::GameOver(notification) => {
                    self.persist_high_score(&notification).await;
                    self.observer.broadcast_game_over(notification).await;
                }
                MatchEvent::ReturnToMenu(reason) => self.observer.return_to_menu(&reason),
            }
        }
    }

    async fn load_high_score(&self) -> Option<u32> {
        let player = self.machine.player()?.clone();
        let mode = self.machine.mode();
        let store = Arc::clone(&self.store);

        match task::spawn_blocking(move || store.get_high_score(&player, mode)).await {
            Ok(Ok(entry)) => entry.map(|entry| entry.score),
            Ok(Err(e)) => {
                log!("Failed to read {} high score: {}", mode, e);
                None
            }
            Err(e) => {
                log!("High score lookup task failed: {}", e);
                None
            }
        }
    }

    async fn persist_high_score(&self, notification: &GameOverNotification) {
        if !notification.is_new_high_score {
            return;
        }
        let Some(player) = notification.player.clone() else {
            return;
        };
        let (mode, score) = (notification.mode, notification.score);
        let store = Arc::clone(&self.store);

        match task::spawn_blocking(move || store.set_high_score(&player, mode, score)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log!("Failed to store {} high score {}: {}", mode, score, e),
            Err(e) => log!("High score write task failed: {}", e),
        }
    }
}

/// First tick one full period from now, late ticks pushed back rather than bunched.
fn repeating(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn tick_optional(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    use tokio::task::JoinHandle;
    use tokio::time::sleep;

    use super::*;
    use crate::PlayerId;
    use crate::games::SessionRng;
    use crate::games::snake::{
        ComboSnapshot, CueEvent, EndReason, FieldSize, GameMode, MatchSettings, MatchSnapshot,
        Position, BLAZING_THRESHOLD,
    };
    use crate::highscore::{HighScoreEntry, HighScoreError, InMemoryHighScoreStore};

    #[derive(Clone, Default)]
    struct RecordingObserver {
        states: Arc<Mutex<Vec<MatchSnapshot>>>,
        cues: Arc<Mutex<Vec<CueEvent>>>,
        game_overs: Arc<Mutex<Vec<GameOverNotification>>>,
        menu_returns: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingObserver {
        fn state_count(&self) -> usize {
            self.states.lock().unwrap().len()
        }

        fn last_state(&self) -> MatchSnapshot {
            self.states.lock().unwrap().last().cloned().unwrap()
        }

        fn game_overs(&self) -> Vec<GameOverNotification> {
            self.game_overs.lock().unwrap().clone()
        }
    }

    impl MatchObserver for RecordingObserver {
        async fn broadcast_state(&self, snapshot: MatchSnapshot) {
            self.states.lock().unwrap().push(snapshot);
        }

        async fn broadcast_game_over(&self, notification: GameOverNotification) {
            self.game_overs.lock().unwrap().push(notification);
        }

        fn play_cue(&self, cue: CueEvent) {
            self.cues.lock().unwrap().push(cue);
        }

        fn return_to_menu(&self, reason: &str) {
            self.menu_returns.lock().unwrap().push(reason.to_string());
        }
    }

    type TestSession = GameSession<InMemoryHighScoreStore, RecordingObserver>;

    fn session(
        mode: GameMode,
        settings: MatchSettings,
        player: Option<&str>,
    ) -> (TestSession, RecordingObserver, InMemoryHighScoreStore) {
        let observer = RecordingObserver::default();
        let store = InMemoryHighScoreStore::new();
        let player = player.map(|name| PlayerId::new(name.to_string()));
        let machine = GameStateMachine::new(mode, settings, player, SessionRng::new(7));
        (
            GameSession::new(machine, store.clone(), observer.clone()),
            observer,
            store,
        )
    }

    fn spawn(session: TestSession) -> (mpsc::UnboundedSender<MatchCommand>, JoinHandle<TestSession>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, tokio::spawn(session.run(rx)))
    }

    fn slow_blitz() -> MatchSettings {
        let mut settings = MatchSettings::for_mode(GameMode::Blitz);
        settings.field_size = FieldSize::new(40, 40);
        settings.tick_interval = Duration::from_secs(10);
        settings
    }

    fn slow_delivery() -> MatchSettings {
        let mut settings = MatchSettings::for_mode(GameMode::Delivery);
        settings.field_size = FieldSize::new(40, 40);
        settings.tick_interval = Duration::from_secs(1);
        settings.countdown_step = Duration::from_millis(700);
        settings
    }

    #[tokio::test(start_paused = true)]
    async fn test_blitz_ends_when_time_runs_out() {
        let (session, observer, _) = session(GameMode::Blitz, slow_blitz(), None);
        let (tx, handle) = spawn(session);
        tx.send(MatchCommand::Start).unwrap();

        // 4 countdown steps of 850ms, then 60 one-second timer ticks.
        sleep(Duration::from_millis(3_400 + 60_000 + 500)).await;

        let game_overs = observer.game_overs();
        assert_eq!(game_overs.len(), 1);
        assert_eq!(game_overs[0].reason, EndReason::TimeExpired);
        assert_eq!(game_overs[0].message, "Time's up!");

        let last = observer.last_state();
        assert_eq!(last.phase, GamePhase::GameOver);
        assert_eq!(last.time_left, Some(0));

        let frozen = observer.state_count();
        sleep(Duration::from_secs(120)).await;
        assert_eq!(observer.state_count(), frozen);

        drop(tx);
        let session = handle.await.unwrap();
        assert_eq!(session.machine().phase(), GamePhase::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_cues_precede_first_move() {
        let (session, observer, _) = session(GameMode::Blitz, slow_blitz(), None);
        let (tx, handle) = spawn(session);
        tx.send(MatchCommand::Start).unwrap();

        sleep(Duration::from_millis(3_000)).await;
        let cues = observer.cues.lock().unwrap().clone();
        assert_eq!(
            cues,
            vec![
                CueEvent::CountdownInProgress,
                CueEvent::CountdownInProgress,
                CueEvent::CountdownInProgress,
                CueEvent::CountdownEnd,
            ]
        );
        assert_eq!(observer.last_state().message, "Go!");
        assert_eq!(observer.last_state().tick, 0);

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_delivery_does_not_advance() {
        let (session, observer, _) = session(GameMode::Delivery, slow_delivery(), Some("courier"));
        let (tx, handle) = spawn(session);
        tx.send(MatchCommand::Start).unwrap();

        // Countdown takes 2.8s; first movement tick one second after that.
        sleep(Duration::from_millis(3_300)).await;
        assert_eq!(observer.last_state().phase, GamePhase::InProgress);
        assert_eq!(observer.last_state().tick, 0);
        let start = observer.last_state().head().unwrap();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(observer.last_state().tick, 1);
        assert_eq!(observer.last_state().head(), Some(Position::new(start.row, start.col + 1)));

        tx.send(MatchCommand::TogglePause).unwrap();
        sleep(Duration::from_secs(10)).await;
        let paused = observer.last_state();
        assert_eq!(paused.phase, GamePhase::Paused);
        assert_eq!(paused.message, "Paused");
        assert_eq!(paused.tick, 1);

        tx.send(MatchCommand::Key(" ".to_string())).unwrap();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(observer.last_state().phase, GamePhase::InProgress);
        assert_eq!(observer.last_state().tick, 1);

        sleep(Duration::from_millis(700)).await;
        assert_eq!(observer.last_state().tick, 2);
        assert_eq!(observer.last_state().head(), Some(Position::new(start.row, start.col + 2)));

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_without_player_returns_to_menu() {
        let (session, observer, _) = session(GameMode::Delivery, slow_delivery(), None);
        let (tx, handle) = spawn(session);
        tx.send(MatchCommand::Start).unwrap();
        drop(tx);

        let session = handle.await.unwrap();
        assert_eq!(session.machine().phase(), GamePhase::PreGame);
        assert_eq!(observer.menu_returns.lock().unwrap().len(), 1);
        assert_eq!(observer.state_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_ends_match_and_restart_runs_again() {
        let mut settings = MatchSettings::for_mode(GameMode::Blitz);
        settings.field_size = FieldSize::new(6, 6);
        settings.countdown_from = 0;
        settings.countdown_step = Duration::from_millis(10);
        settings.tick_interval = Duration::from_millis(100);

        let (session, observer, _) = session(GameMode::Blitz, settings, None);
        let (tx, handle) = spawn(session);

        tx.send(MatchCommand::Start).unwrap();
        sleep(Duration::from_secs(1)).await;
        let first = observer.game_overs();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].reason, EndReason::OutOfBounds);
        assert_eq!(first[0].ticks, 3);

        // No timer survives the finished match.
        let frozen = observer.state_count();
        sleep(Duration::from_secs(90)).await;
        assert_eq!(observer.state_count(), frozen);

        tx.send(MatchCommand::Start).unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(observer.game_overs().len(), 2);
        assert_eq!(observer.last_state().tick, 3);

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_best_reaches_first_snapshot() {
        let (session, observer, store) = session(GameMode::Blitz, slow_blitz(), Some("ace"));
        let player = PlayerId::new("ace".to_string());
        store.set_high_score(&player, GameMode::Blitz, 12).unwrap();

        let (tx, handle) = spawn(session);
        tx.send(MatchCommand::Start).unwrap();
        sleep(Duration::from_millis(100)).await;

        assert_eq!(observer.states.lock().unwrap()[0].high_score, Some(12));
        drop(tx);
        handle.await.unwrap();
    }

    fn notification(player: Option<&str>, score: u32, is_new_high_score: bool) -> GameOverNotification {
        GameOverNotification {
            mode: GameMode::Blitz,
            player: player.map(|name| PlayerId::new(name.to_string())),
            score,
            previous_best: Some(4),
            is_new_high_score,
            reason: EndReason::SelfCollision,
            message: "Game over!".to_string(),
            ticks: 40,
        }
    }

    #[tokio::test]
    async fn test_new_best_is_written_through() {
        let (mut session, observer, store) = session(GameMode::Blitz, slow_blitz(), Some("ace"));
        session
            .dispatch(vec![MatchEvent::GameOver(notification(Some("ace"), 9, true))])
            .await;

        let player = PlayerId::new("ace".to_string());
        let entry = store.get_high_score(&player, GameMode::Blitz).unwrap().unwrap();
        assert_eq!(entry.score, 9);
        assert_eq!(observer.game_overs().len(), 1);
    }

    #[tokio::test]
    async fn test_score_below_best_is_not_written() {
        let (mut session, _, store) = session(GameMode::Blitz, slow_blitz(), Some("ace"));
        session
            .dispatch(vec![MatchEvent::GameOver(notification(Some("ace"), 3, false))])
            .await;
        session
            .dispatch(vec![MatchEvent::GameOver(notification(None, 30, true))])
            .await;

        assert!(store.table().unwrap().entries.is_empty());
    }

    #[derive(Clone, Default)]
    struct ThreadTrackingStore {
        inner: InMemoryHighScoreStore,
        threads: Arc<Mutex<Vec<ThreadId>>>,
    }

    impl HighScoreStore for ThreadTrackingStore {
        fn get_high_score(
            &self,
            player: &PlayerId,
            mode: GameMode,
        ) -> Result<Option<HighScoreEntry>, HighScoreError> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            self.inner.get_high_score(player, mode)
        }

        fn set_high_score(&self, player: &PlayerId, mode: GameMode, score: u32) -> Result<(), HighScoreError> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            self.inner.set_high_score(player, mode, score)
        }
    }

    #[tokio::test]
    async fn test_store_calls_leave_the_session_task() {
        let store = ThreadTrackingStore::default();
        let machine = GameStateMachine::new(
            GameMode::Blitz,
            slow_blitz(),
            Some(PlayerId::new("ace".to_string())),
            SessionRng::new(7),
        );
        let session = GameSession::new(machine, store.clone(), RecordingObserver::default());

        assert_eq!(session.load_high_score().await, None);
        session.persist_high_score(&notification(Some("ace"), 9, true)).await;

        let threads = store.threads.lock().unwrap().clone();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != std::thread::current().id()));
        let player = PlayerId::new("ace".to_string());
        assert_eq!(store.inner.get_high_score(&player, GameMode::Blitz).unwrap().unwrap().score, 9);
    }

    fn feed_next_cell(machine: &mut GameStateMachine) {
        let next = machine.gameboard().snake.next_head(crate::games::snake::Direction::None);
        machine.gameboard_mut().place_pellet(next);
    }

    async fn drive_for<F: Future + Unpin>(driver: &mut F, duration: Duration) -> Option<F::Output> {
        tokio::select! {
            output = driver => Some(output),
            _ = sleep(duration) => None,
        }
    }

    fn blazing_settings() -> MatchSettings {
        let mut settings = MatchSettings::for_mode(GameMode::Blitz);
        settings.field_size = FieldSize::new(40, 40);
        settings.tick_interval = Duration::from_millis(3_500);
        settings.combo_decay_interval = Duration::from_millis(50);
        settings.time_limit_secs = Some(7);
        settings
    }

    #[tokio::test(start_paused = true)]
    async fn test_combo_decay_cadence_and_shutdown() {
        let (mut session, observer, _) = session(GameMode::Blitz, blazing_settings(), None);
        session.machine.begin_setup(None);
        session.machine.enter_in_progress();
        for _ in 0..BLAZING_THRESHOLD {
            feed_next_cell(&mut session.machine);
            session.machine.movement_tick();
        }
        assert!(session.machine.is_decaying());
        // Eaten by the first movement tick, half way through the drain.
        feed_next_cell(&mut session.machine);

        let cleared = ComboSnapshot { consecutive_count: 0, boost_progress: 0, is_blazing: false };
        let (_tx, mut rx) = mpsc::unbounded_channel();
        {
            let driver = session.play(&mut rx);
            tokio::pin!(driver);

            // 69 decay steps to 31, +20 from the consumption at 3.5s, then that instant's step.
            assert!(drive_for(&mut driver, Duration::from_millis(3_525)).await.is_none());
            assert_eq!(
                observer.last_state().combo,
                Some(ComboSnapshot { consecutive_count: 5, boost_progress: 50, is_blazing: true })
            );
            assert_eq!(observer.last_state().score, 6);

            // Remaining 50 steps end at 6s.
            assert!(drive_for(&mut driver, Duration::from_millis(2_975)).await.is_none());
            assert_eq!(observer.last_state().combo, Some(cleared));
            assert_eq!(observer.last_state().tick, 6);

            let finished = drive_for(&mut driver, Duration::from_secs(1)).await;
            assert_eq!(finished, Some(ControlFlow::Continue(())));
        }
        assert_eq!(observer.game_overs()[0].reason, EndReason::TimeExpired);

        let frozen = observer.state_count();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(observer.state_count(), frozen);
        assert_eq!(session.machine.snapshot().combo, Some(cleared));

        // A new match starts with an idle tracker and no decay left over.
        session.machine.begin_setup(None);
        session.machine.enter_in_progress();
        let driver = session.play(&mut rx);
        tokio::pin!(driver);
        assert!(drive_for(&mut driver, Duration::from_millis(1_500)).await.is_none());
        assert_eq!(observer.last_state().combo, Some(cleared));
        assert_eq!(observer.last_state().tick, 0);
    }
}
