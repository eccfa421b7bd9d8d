use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;

use crate::snake::{Cell, Heading};

pub const GRID_SIZE: i32 = 30;
pub const START_CELL: Cell = Cell::new(8, 8);
pub const START_SPEED: f64 = 6.0;
pub const SPEED_INCREMENT: f64 = 0.15;

/// Bounds on the starting speed, in ticks per second
pub const MIN_SPEED: f64 = 0.01;
pub const MAX_SPEED: f64 = 1_000.0;

pub const OBSTACLE_MIN: usize = 1;
pub const OBSTACLE_MAX: usize = 7;

/// Roughly one display refresh at 60Hz
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Widest the board may get, in terminal columns
pub const MAX_BOARD_COLUMNS: u16 = 62;

pub const TILT_SMOOTHING: f64 = 0.2;
pub const TILT_THRESHOLD: f64 = 3.5;

/// Random probes before placement falls back to enumerating free cells
pub const PLACEMENT_ATTEMPTS: usize = 1_000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid size must be at least 2, got {0}")]
    GridTooSmall(i32),
    #[error("start cell ({x}, {y}) lies outside a {size}x{size} grid")]
    StartOutOfBounds { x: i32, y: i32, size: i32 },
    #[error("start speed must lie in 0.01..=1000 ticks per second, got {0}")]
    SpeedOutOfRange(f64),
    #[error("obstacle range {min}..={max} is empty")]
    EmptyObstacleRange { min: usize, max: usize },
    #[error("tilt smoothing factor must lie in (0, 1], got {0}")]
    BadSmoothing(f64),
}

/// Everything a session needs to know before the first tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub grid_size: i32,
    pub start_cell: Cell,
    pub start_heading: Heading,
    pub start_speed: f64,
    pub speed_increment: f64,
    pub obstacle_min: usize,
    pub obstacle_max: usize,
    pub placement_attempts: usize,
    pub frame_interval: Duration,
    pub max_board_columns: u16,
    pub tilt_smoothing: f64,
    pub tilt_threshold: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_size: GRID_SIZE,
            start_cell: START_CELL,
            start_heading: Heading::Right,
            start_speed: START_SPEED,
            speed_increment: SPEED_INCREMENT,
            obstacle_min: OBSTACLE_MIN,
            obstacle_max: OBSTACLE_MAX,
            placement_attempts: PLACEMENT_ATTEMPTS,
            frame_interval: FRAME_INTERVAL,
            max_board_columns: MAX_BOARD_COLUMNS,
            tilt_smoothing: TILT_SMOOTHING,
            tilt_threshold: TILT_THRESHOLD,
        }
    }
}

impl GameConfig {
    pub fn obstacle_range(&self) -> RangeInclusive<usize> {
        self.obstacle_min..=self.obstacle_max
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }

        let Cell { x, y } = self.start_cell;
        if x < 0 || y < 0 || x >= self.grid_size || y >= self.grid_size {
            return Err(ConfigError::StartOutOfBounds { x, y, size: self.grid_size });
        }

        if !(MIN_SPEED..=MAX_SPEED).contains(&self.start_speed) {
            return Err(ConfigError::SpeedOutOfRange(self.start_speed));
        }

        if self.obstacle_min > self.obstacle_max {
            return Err(ConfigError::EmptyObstacleRange {
                min: self.obstacle_min,
                max: self.obstacle_max,
            });
        }

        if !(self.tilt_smoothing > 0.0 && self.tilt_smoothing <= 1.0) {
            return Err(ConfigError::BadSmoothing(self.tilt_smoothing));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 30);
        assert_eq!(config.start_cell, Cell::new(8, 8));
        assert_eq!(config.start_heading, Heading::Right);
        assert_eq!(config.obstacle_range(), 1..=7);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_start_cell_must_be_on_grid() {
        let config = GameConfig { grid_size: 8, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StartOutOfBounds { x: 8, y: 8, size: 8 })
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let tiny = GameConfig { grid_size: 1, ..Default::default() };
        assert_eq!(tiny.validate(), Err(ConfigError::GridTooSmall(1)));

        let stalled = GameConfig { start_speed: 0.0, ..Default::default() };
        assert_eq!(stalled.validate(), Err(ConfigError::SpeedOutOfRange(0.0)));

        let inverted = GameConfig { obstacle_min: 4, obstacle_max: 2, ..Default::default() };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::EmptyObstacleRange { min: 4, max: 2 })
        ));

        let undefined = GameConfig { start_speed: f64::NAN, ..Default::default() };
        assert!(matches!(undefined.validate(), Err(ConfigError::SpeedOutOfRange(_))));

        let frozen = GameConfig { tilt_smoothing: 0.0, ..Default::default() };
        assert_eq!(frozen.validate(), Err(ConfigError::BadSmoothing(0.0)));
    }

    #[test]
    fn test_speed_must_give_a_representable_interval() {
        let glacial = GameConfig { start_speed: 1e-20, ..Default::default() };
        assert_eq!(glacial.validate(), Err(ConfigError::SpeedOutOfRange(1e-20)));

        let frantic = GameConfig { start_speed: 1e6, ..Default::default() };
        assert_eq!(frantic.validate(), Err(ConfigError::SpeedOutOfRange(1e6)));

        for speed in [MIN_SPEED, MAX_SPEED] {
            let edge = GameConfig { start_speed: speed, ..Default::default() };
            assert_eq!(edge.validate(), Ok(()));
        }
    }
}
