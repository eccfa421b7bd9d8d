use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::input::HeadingInbox;
use crate::snake::{Cell, Heading};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfHit,
    Obstacle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { new_head: Cell, old_tail: Option<Cell> },
    Ate { new_head: Cell, score: u32 },
    Crashed(Collision),
    /// The session is paused or over; nothing moved.
    Idle,
}

/// One game from start to crash. Owns the world, the heading inbox and the
/// random source used for every placement, so a seeded source replays a game
/// exactly.
pub struct Session {
    config: GameConfig,
    rng: StdRng,
    world: World,
    heading: HeadingInbox,
    speed: f64,
    score: u32,
    phase: Phase,
}

impl Session {
    pub fn new(config: GameConfig, rng: StdRng) -> Self {
        let world = World::new(config.grid_size, config.start_cell);
        let heading = HeadingInbox::new(config.start_heading);
        let speed = config.start_speed;

        let mut session = Session { config, rng, world, heading, speed, score: 0, phase: Phase::Running };
        session.reset();
        session
    }

    /// Discards the current game and lays out a fresh one: new snake, new
    /// obstacle count and positions, new food.
    pub fn reset(&mut self) {
        let config = &self.config;
        self.world = World::new(config.grid_size, config.start_cell);
        self.heading = HeadingInbox::new(config.start_heading);
        self.speed = config.start_speed;
        self.score = 0;
        self.phase = Phase::Running;

        let wanted = self.rng.gen_range(config.obstacle_range());
        let placed = self.world.place_obstacles(wanted, &mut self.rng, config.placement_attempts);
        self.world.place_food(&mut self.rng, config.placement_attempts);

        info!(obstacles = placed, food = ?self.world.food, "New game");
    }

    /// Advances the world by exactly one tick using the latest accepted heading.
    pub fn step(&mut self) -> StepOutcome {
        if self.phase != Phase::Running {
            return StepOutcome::Idle;
        }

        let heading = self.heading.take();
        let new_head = self.world.path.head().step(heading);

        if let Some(collision) = self.collision_at(new_head) {
            self.phase = Phase::Over;
            info!(?collision, score = self.score, "Game over");
            return StepOutcome::Crashed(collision);
        }

        let ate = self.world.food == Some(new_head);
        let old_tail = self.world.path.advance(new_head, ate);

        if !ate {
            return StepOutcome::Moved { new_head, old_tail };
        }

        self.score += 1;
        self.speed += self.config.speed_increment;
        let food = self.world.place_food(&mut self.rng, self.config.placement_attempts);
        debug!(score = self.score, speed = self.speed, ?food, "Food eaten");

        StepOutcome::Ate { new_head, score: self.score }
    }

    fn collision_at(&self, cell: Cell) -> Option<Collision> {
        if self.world.is_out_of_bounds(cell) {
            Some(Collision::Wall)
        } else if self.world.is_occupied_by_path(cell) {
            Some(Collision::SelfHit)
        } else if self.world.is_occupied_by_obstacle(cell) {
            Some(Collision::Obstacle)
        } else {
            None
        }
    }

    /// Returns whether the request was accepted.
    pub fn set_heading(&mut self, heading: Heading) -> bool {
        self.heading.request(heading)
    }

    /// Flips between Running and Paused. A finished game stays finished.
    pub fn toggle_pause(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            Phase::Over => Phase::Over,
        };
        debug!(phase = ?self.phase, "Pause toggled");
        self.phase
    }

    /// Time between two ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.speed).unwrap_or(Duration::MAX)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn heading(&self) -> Heading {
        self.heading.travelled()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
