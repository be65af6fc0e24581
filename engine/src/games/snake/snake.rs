use std::collections::VecDeque;

use super::types::{Direction, FieldSize, Position};

#[derive(Clone, Debug)]
pub struct Snake {
    /// Head first.
    pub body: VecDeque<Position>,
    pub direction: Direction,
    pub pellets_consumed: u32,
    pub is_out_of_bounds: bool,
    pub has_collided_with_self: bool,
    pub is_blazing: bool,
}

impl Snake {
    /// Lays `length` segments out behind `head`, opposite to `direction`.
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let direction = if direction.is_none() { Direction::Right } else { direction };
        let (d_row, d_col) = direction.offset();

        let body = (0..length.max(1) as i32)
            .map(|i| Position::new(head.row - d_row * i, head.col - d_col * i))
            .collect();

        Self {
            body,
            direction,
            pellets_consumed: 0,
            is_out_of_bounds: false,
            has_collided_with_self: false,
            is_blazing: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_out_of_bounds && !self.has_collided_with_self
    }

    pub fn head(&self) -> Position {
        *self.body.front().expect("Snake body should never be empty")
    }

    pub fn tail(&self) -> Position {
        *self.body.back().expect("Snake body should never be empty")
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Direction a move would actually use: `None` and reversals keep the heading.
    pub fn resolve_direction(&self, requested: Direction) -> Direction {
        if requested.is_none() || requested.is_opposite(&self.direction) {
            self.direction
        } else {
            requested
        }
    }

    pub fn next_head(&self, requested: Direction) -> Position {
        self.head().step(self.resolve_direction(requested))
    }

    /// Moves one cell. The move is applied even when it is fatal so the final
    /// position stays observable; the flags record what went wrong.
    pub fn advance(&mut self, requested: Direction, field: &FieldSize, grows: bool) -> Position {
        let applied = self.resolve_direction(requested);
        let new_head = self.head().step(applied);

        let vacated_tail = if grows { None } else { Some(self.tail()) };
        let hits_body = self.occupies(new_head) && vacated_tail != Some(new_head);

        self.direction = applied;
        self.body.push_front(new_head);
        if grows {
            self.pellets_consumed += 1;
        } else {
            self.body.pop_back();
        }

        if !field.contains(new_head) {
            self.is_out_of_bounds = true;
        }
        if hits_body {
            self.has_collided_with_self = true;
        }

        new_head
    }
}
