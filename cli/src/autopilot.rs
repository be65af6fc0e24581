use rand::Rng;
use snake_arcade_engine::games::snake::{Direction, MatchSnapshot, Position, MOVEMENT_DIRECTIONS};

/// Greedy steering: the safe turn that brings the head closest to the current
/// target, falling back to any safe turn, then to going straight.
pub struct Autopilot;

impl Autopilot {
    pub fn calculate_move(snapshot: &MatchSnapshot) -> Option<Direction> {
        let head = snapshot.head()?;
        let heading = snapshot.heading;
        let safe = Self::safe_directions(head, heading, snapshot);

        if let Some(target) = snapshot.target() {
            let best = safe
                .iter()
                .copied()
                .min_by_key(|dir| head.step(*dir).manhattan_distance(target));
            if best.is_some() {
                return best;
            }
        }

        if safe.is_empty() {
            return Some(heading);
        }
        let idx = rand::rng().random_range(0..safe.len());
        Some(safe[idx])
    }

    /// Like [`Autopilot::calculate_move`], but only returns a key when a turn is needed.
    pub fn key_for(snapshot: &MatchSnapshot) -> Option<&'static str> {
        let direction = Self::calculate_move(snapshot)?;
        if direction == snapshot.heading {
            return None;
        }
        direction.key()
    }

    fn safe_directions(head: Position, heading: Direction, snapshot: &MatchSnapshot) -> Vec<Direction> {
        MOVEMENT_DIRECTIONS
            .into_iter()
            .filter(|dir| !dir.is_opposite(&heading))
            .filter(|dir| Self::is_safe_position(head.step(*dir), snapshot))
            .collect()
    }

    fn is_safe_position(pos: Position, snapshot: &MatchSnapshot) -> bool {
        if !snapshot.field_size.contains(pos) {
            return false;
        }
        // The tail cell frees up on the same tick, unless the snake grows.
        let body_len = snapshot.snake.len().saturating_sub(1);
        !snapshot.snake[..body_len].contains(&pos)
    }
}
