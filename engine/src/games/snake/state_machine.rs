use crate::games::SessionRng;
use crate::{debug_log, log, PlayerId};
use super::clock::{Countdown, CountdownStep, MatchTimer};
use super::combo::{ComboTracker, ComboUpdate};
use super::direction_queue::DirectionQueue;
use super::events::{ComboSnapshot, GameOverNotification, MatchCommand, MatchEvent, MatchSnapshot};
use super::gameboard::{Gameboard, MoveOutcome};
use super::settings::MatchSettings;
use super::types::{CueEvent, Direction, EndReason, GameMode, GamePhase};

pub const PAUSE_KEY: &str = " ";

const PAUSED_MESSAGE: &str = "Paused";
const GAME_OVER_MESSAGE: &str = "Game over!";
const TIME_UP_MESSAGE: &str = "Time's up!";

/// Match lifecycle for one mode: `PreGame -> Setup -> InProgress <-> Paused -> GameOver`.
///
/// Every operation is synchronous and returns the events it produced; the
/// async session decides when operations run. Tick operations outside
/// `InProgress` are no-ops, which is what freezes a finished match.
pub struct GameStateMachine {
    mode: GameMode,
    settings: MatchSettings,
    player: Option<PlayerId>,
    phase: GamePhase,
    gameboard: Gameboard,
    queue: DirectionQueue,
    combo: Option<ComboTracker>,
    timer: MatchTimer,
    score: u32,
    high_score: Option<u32>,
    message: String,
    end_reason: Option<EndReason>,
    tick: u64,
    rng: SessionRng,
}

impl GameStateMachine {
    pub fn new(
        mode: GameMode,
        settings: MatchSettings,
        player: Option<PlayerId>,
        rng: SessionRng,
    ) -> Self {
        Self {
            gameboard: Gameboard::new(settings.field_size, mode),
            queue: DirectionQueue::new(settings.queue_capacity),
            combo: settings.combo_enabled.then(ComboTracker::new),
            timer: MatchTimer::new(settings.time_limit_secs),
            mode,
            settings,
            player,
            phase: GamePhase::PreGame,
            score: 0,
            high_score: None,
            message: String::new(),
            end_reason: None,
            tick: 0,
            rng,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn player(&self) -> Option<&PlayerId> {
        self.player.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> Option<u32> {
        self.high_score
    }

    pub fn time_left(&self) -> Option<u32> {
        self.timer.time_left()
    }

    pub fn is_time_limited(&self) -> bool {
        self.timer.is_time_limited()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn gameboard(&self) -> &Gameboard {
        &self.gameboard
    }

    pub fn queue(&self) -> &DirectionQueue {
        &self.queue
    }

    pub fn combo(&self) -> Option<&ComboTracker> {
        self.combo.as_ref()
    }

    pub fn is_decaying(&self) -> bool {
        self.combo.as_ref().is_some_and(|combo| combo.is_decaying())
    }

    pub fn countdown(&self) -> Countdown {
        Countdown::new(self.settings.countdown_from)
    }

    /// Start request. Replaces every per-match entity with a fresh one.
    pub fn begin_setup(&mut self, high_score: Option<u32>) -> Vec<MatchEvent> {
        if !self.phase.is_pre_game_or_game_over() {
            return Vec::new();
        }

        if self.mode == GameMode::Delivery && self.player.is_none() {
            log!("Delivery mode needs a player name, returning to menu");
            return vec![MatchEvent::ReturnToMenu("no player name stored".to_string())];
        }

        self.phase = GamePhase::Setup;
        self.score = 0;
        self.high_score = high_score;
        self.message.clear();
        self.end_reason = None;
        self.tick = 0;
        self.queue = DirectionQueue::new(self.settings.queue_capacity);
        self.combo = self.settings.combo_enabled.then(ComboTracker::new);
        self.timer = MatchTimer::new(self.settings.time_limit_secs);

        self.gameboard.reset();
        self.gameboard.spawn_snake(self.settings.snake_length);
        self.spawn_consumables();

        log!(
            "[{}] Setup complete on {}x{} field (seed {})",
            self.mode,
            self.settings.field_size.width,
            self.settings.field_size.height,
            self.rng.seed()
        );
        vec![MatchEvent::State(self.snapshot())]
    }

    pub fn show_countdown_step(&mut self, step: CountdownStep) -> Vec<MatchEvent> {
        if self.phase != GamePhase::Setup {
            return Vec::new();
        }
        self.message = step.label();
        vec![MatchEvent::Cue(step.cue()), MatchEvent::State(self.snapshot())]
    }

    pub fn enter_in_progress(&mut self) -> Vec<MatchEvent> {
        if self.phase != GamePhase::Setup {
            return Vec::new();
        }
        self.phase = GamePhase::InProgress;
        self.timer.start();
        self.message = self.running_message();
        log!("[{}] Match started", self.mode);
        vec![MatchEvent::State(self.snapshot())]
    }

    pub fn handle_command(&mut self, command: MatchCommand) -> Vec<MatchEvent> {
        match command {
            MatchCommand::Start => Vec::new(),
            MatchCommand::TogglePause => self.toggle_pause(),
            MatchCommand::Key(key) => self.handle_direction_key(&key),
        }
    }

    pub fn handle_direction_key(&mut self, key: &str) -> Vec<MatchEvent> {
        if key == PAUSE_KEY {
            return self.toggle_pause();
        }
        if self.phase != GamePhase::InProgress {
            return Vec::new();
        }

        let direction = Direction::from_key(key);
        if self.queue.enqueue(direction, self.gameboard.snake.direction) {
            debug_log!("Queued {:?}, pending {:?}", direction, self.queue.pending());
        }
        Vec::new()
    }

    pub fn toggle_pause(&mut self) -> Vec<MatchEvent> {
        if !self.settings.pause_allowed {
            return Vec::new();
        }

        match self.phase {
            GamePhase::InProgress => {
                self.phase = GamePhase::Paused;
                self.message = PAUSED_MESSAGE.to_string();
                log!("[{}] Paused at tick {}", self.mode, self.tick);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::InProgress;
                self.message = self.running_message();
                log!("[{}] Resumed at tick {}", self.mode, self.tick);
            }
            _ => return Vec::new(),
        }
        vec![MatchEvent::State(self.snapshot())]
    }

    pub fn movement_tick(&mut self) -> Vec<MatchEvent> {
        if self.phase != GamePhase::InProgress {
            return Vec::new();
        }

        let mut events = Vec::new();
        self.tick += 1;

        let direction = self.queue.dequeue_next();
        let outcome = self.gameboard.move_snake(direction);
        self.score = self.gameboard.snake.pellets_consumed;

        if outcome.is_consumption() {
            self.on_consumed(&mut events);
        } else if outcome == MoveOutcome::ParcelPickedUp {
            debug_log!("[{}] Parcel picked up at tick {}", self.mode, self.tick);
            events.push(MatchEvent::Cue(CueEvent::ParcelPickedUp));
        }

        match self.termination_reason() {
            Some(reason) => self.finish(reason, &mut events),
            None => events.push(MatchEvent::State(self.snapshot())),
        }
        events
    }

    pub fn timer_tick(&mut self) -> Vec<MatchEvent> {
        if self.phase != GamePhase::InProgress {
            return Vec::new();
        }
        let Some(time_left) = self.timer.tick_second() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        self.message = time_left.to_string();
        if time_left == 0 {
            self.finish(EndReason::TimeExpired, &mut events);
        } else {
            events.push(MatchEvent::State(self.snapshot()));
        }
        events
    }

    pub fn decay_tick(&mut self) -> Vec<MatchEvent> {
        if self.phase != GamePhase::InProgress {
            return Vec::new();
        }
        let Some(combo) = self.combo.as_mut() else {
            return Vec::new();
        };
        if !combo.is_decaying() {
            return Vec::new();
        }

        combo.decay_step();
        self.gameboard.snake.is_blazing = combo.is_blazing();
        vec![MatchEvent::State(self.snapshot())]
    }

    fn on_consumed(&mut self, events: &mut Vec<MatchEvent>) {
        log!("[{}] Consumed at tick {}, score {}", self.mode, self.tick, self.score);
        events.push(MatchEvent::Cue(CueEvent::PelletConsumed));
        self.spawn_consumables();

        if let Some(combo) = self.combo.as_mut() {
            if combo.record_consumption() == ComboUpdate::BlazingStarted {
                events.push(MatchEvent::Cue(CueEvent::BlazingStarted));
            }
            self.gameboard.snake.is_blazing = combo.is_blazing();
        }
    }

    fn spawn_consumables(&mut self) {
        match self.mode {
            GameMode::Blitz => {
                self.gameboard.spawn_pellet(&mut self.rng);
            }
            GameMode::Delivery => {
                self.gameboard.spawn_parcel(&mut self.rng);
                self.gameboard.spawn_delivery_point(&mut self.rng);
            }
        }
    }

    fn termination_reason(&self) -> Option<EndReason> {
        let snake = &self.gameboard.snake;
        if snake.is_out_of_bounds {
            Some(EndReason::OutOfBounds)
        } else if snake.has_collided_with_self {
            Some(EndReason::SelfCollision)
        } else if self.timer.is_time_limited() && self.timer.is_expired() {
            Some(EndReason::TimeExpired)
        } else {
            None
        }
    }

    fn finish(&mut self, reason: EndReason, events: &mut Vec<MatchEvent>) {
        self.timer.stop();
        if let Some(combo) = self.combo.as_mut() {
            combo.force_clear();
        }
        self.gameboard.snake.is_blazing = false;
        self.queue.clear();

        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);
        self.message = match reason {
            EndReason::TimeExpired => TIME_UP_MESSAGE.to_string(),
            EndReason::OutOfBounds | EndReason::SelfCollision => GAME_OVER_MESSAGE.to_string(),
        };

        let previous_best = self.high_score;
        let is_new_high_score = self.score > previous_best.unwrap_or(0);
        if is_new_high_score {
            self.high_score = Some(self.score);
        }

        log!(
            "[{}] Game over ({:?}) after {} ticks, score {}",
            self.mode,
            reason,
            self.tick,
            self.score
        );

        events.push(MatchEvent::Cue(CueEvent::GameOver));
        events.push(MatchEvent::State(self.snapshot()));
        events.push(MatchEvent::GameOver(GameOverNotification {
            mode: self.mode,
            player: self.player.clone(),
            score: self.score,
            previous_best,
            is_new_high_score,
            reason,
            message: self.message.clone(),
            ticks: self.tick,
        }));
    }

    fn running_message(&self) -> String {
        self.timer
            .time_left()
            .map(|left| left.to_string())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let snake = &self.gameboard.snake;
        MatchSnapshot {
            mode: self.mode,
            phase: self.phase,
            tick: self.tick,
            score: self.score,
            high_score: self.high_score,
            time_left: self.timer.time_left(),
            message: self.message.clone(),
            field_size: self.gameboard.field_size,
            snake: snake.body.iter().copied().collect(),
            heading: snake.direction,
            consumables: self.gameboard.consumables.clone(),
            combo: self.combo.as_ref().map(|combo| ComboSnapshot {
                consecutive_count: combo.consecutive_count(),
                boost_progress: combo.boost_progress(),
                is_blazing: combo.is_blazing(),
            }),
            end_reason: self.end_reason,
        }
    }

    #[cfg(test)]
    pub(crate) fn gameboard_mut(&mut self) -> &mut Gameboard {
        &mut self.gameboard
    }
}
