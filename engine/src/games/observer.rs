use std::future::Future;

use super::snake::{CueEvent, GameOverNotification, MatchSnapshot};

/// Outbound seam to rendering, audio and menu collaborators.
pub trait MatchObserver: Send + Sync + Clone + 'static {
    fn broadcast_state(&self, snapshot: MatchSnapshot) -> impl Future<Output = ()> + Send;

    fn broadcast_game_over(
        &self,
        notification: GameOverNotification,
    ) -> impl Future<Output = ()> + Send;

    /// Fire-and-forget; the engine never waits for a cue to finish.
    fn play_cue(&self, cue: CueEvent);

    fn return_to_menu(&self, reason: &str);
}
