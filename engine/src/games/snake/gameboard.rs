use crate::games::SessionRng;
use crate::{debug_log, log};
use super::snake::Snake;
use super::types::{Direction, FieldSize, GameMode, Position};

pub const DEFAULT_SNAKE_LENGTH: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Consumables {
    Pellet {
        pellet: Option<Position>,
    },
    Delivery {
        parcel: Option<Position>,
        delivery_point: Option<Position>,
        carrying_parcel: bool,
    },
}

impl Consumables {
    pub fn empty(mode: GameMode) -> Self {
        match mode {
            GameMode::Blitz => Consumables::Pellet { pellet: None },
            GameMode::Delivery => Consumables::Delivery {
                parcel: None,
                delivery_point: None,
                carrying_parcel: false,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    PelletConsumed,
    ParcelPickedUp,
    ParcelDelivered,
    OutOfBounds,
    SelfCollision,
}

impl MoveOutcome {
    /// Growth events: a pellet eaten or a parcel delivered.
    pub fn is_consumption(&self) -> bool {
        matches!(self, MoveOutcome::PelletConsumed | MoveOutcome::ParcelDelivered)
    }
}

#[derive(Clone, Debug)]
pub struct Gameboard {
    pub field_size: FieldSize,
    pub snake: Snake,
    pub consumables: Consumables,
    mode: GameMode,
}

impl Gameboard {
    pub fn new(field_size: FieldSize, mode: GameMode) -> Self {
        Self {
            snake: Self::starting_snake(&field_size, DEFAULT_SNAKE_LENGTH),
            field_size,
            consumables: Consumables::empty(mode),
            mode,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn reset(&mut self) {
        self.snake = Self::starting_snake(&self.field_size, DEFAULT_SNAKE_LENGTH);
        self.consumables = Consumables::empty(self.mode);
    }

    /// Head at the field centre heading right, body trailing left.
    pub fn spawn_snake(&mut self, length: usize) {
        self.snake = Self::starting_snake(&self.field_size, length);
        debug_log!(
            "Snake spawned at ({}, {}) with length {}",
            self.snake.head().row,
            self.snake.head().col,
            self.snake.len()
        );
    }

    fn starting_snake(field_size: &FieldSize, length: usize) -> Snake {
        let head = Position::new((field_size.height / 2) as i32, (field_size.width / 2) as i32);
        Snake::new(head, Direction::Right, length)
    }

    pub fn spawn_pellet(&mut self, rng: &mut SessionRng) -> Option<Position> {
        let picked = match self.consumables {
            Consumables::Pellet { .. } => self.pick_free_cell(None, rng),
            Consumables::Delivery { .. } => return None,
        };
        if let Consumables::Pellet { pellet } = &mut self.consumables {
            *pellet = picked;
        }
        Self::log_spawn("Pellet", picked);
        picked
    }

    pub fn spawn_parcel(&mut self, rng: &mut SessionRng) -> Option<Position> {
        let picked = match self.consumables {
            Consumables::Delivery { delivery_point, .. } => self.pick_free_cell(delivery_point, rng),
            Consumables::Pellet { .. } => return None,
        };
        if let Consumables::Delivery { parcel, carrying_parcel, .. } = &mut self.consumables {
            *parcel = picked;
            *carrying_parcel = false;
        }
        Self::log_spawn("Parcel", picked);
        picked
    }

    pub fn spawn_delivery_point(&mut self, rng: &mut SessionRng) -> Option<Position> {
        let picked = match self.consumables {
            Consumables::Delivery { parcel, .. } => self.pick_free_cell(parcel, rng),
            Consumables::Pellet { .. } => return None,
        };
        if let Consumables::Delivery { delivery_point, .. } = &mut self.consumables {
            *delivery_point = picked;
        }
        Self::log_spawn("Delivery point", picked);
        picked
    }

    fn log_spawn(what: &str, picked: Option<Position>) {
        match picked {
            Some(pos) => debug_log!("{} spawned at ({}, {})", what, pos.row, pos.col),
            None => log!("{} not spawned: no free cell left", what),
        }
    }

    /// Uniform pick among cells free of the snake and of `also_excluded`.
    fn pick_free_cell(&self, also_excluded: Option<Position>, rng: &mut SessionRng) -> Option<Position> {
        let free: Vec<Position> = self
            .field_size
            .cells()
            .filter(|cell| !self.snake.occupies(*cell) && also_excluded != Some(*cell))
            .collect();
        rng.pick(&free).copied()
    }

    pub fn move_snake(&mut self, direction: Direction) -> MoveOutcome {
        let target = self.snake.next_head(direction);

        let grows = match &self.consumables {
            Consumables::Pellet { pellet } => *pellet == Some(target),
            Consumables::Delivery { delivery_point, carrying_parcel, .. } => {
                *carrying_parcel && *delivery_point == Some(target)
            }
        };

        self.snake.advance(direction, &self.field_size, grows);

        if self.snake.is_out_of_bounds {
            return MoveOutcome::OutOfBounds;
        }
        if self.snake.has_collided_with_self {
            return MoveOutcome::SelfCollision;
        }

        match &mut self.consumables {
            Consumables::Pellet { pellet } if grows => {
                *pellet = None;
                MoveOutcome::PelletConsumed
            }
            Consumables::Delivery { delivery_point, carrying_parcel, .. } if grows => {
                *delivery_point = None;
                *carrying_parcel = false;
                MoveOutcome::ParcelDelivered
            }
            Consumables::Delivery { parcel, carrying_parcel, .. }
                if !*carrying_parcel && *parcel == Some(target) =>
            {
                *parcel = None;
                *carrying_parcel = true;
                MoveOutcome::ParcelPickedUp
            }
            _ => MoveOutcome::Moved,
        }
    }

    #[cfg(test)]
    pub(crate) fn place_pellet(&mut self, pos: Position) {
        self.consumables = Consumables::Pellet { pellet: Some(pos) };
    }

    #[cfg(test)]
    pub(crate) fn place_delivery(&mut self, parcel: Option<Position>, delivery_point: Option<Position>) {
        self.consumables = Consumables::Delivery {
            parcel,
            delivery_point,
            carrying_parcel: false,
        };
    }
}
