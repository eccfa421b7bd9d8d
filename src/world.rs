use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::snake::{Cell, Path};

/// Square grid holding the snake, the static obstacles and at most one food.
#[derive(Debug, Clone)]
pub struct World {
    grid_size: i32,
    pub path: Path,
    pub obstacles: HashSet<Cell>,
    pub food: Option<Cell>,
}

impl World {
    pub fn new(grid_size: i32, start: Cell) -> Self {
        World { grid_size, path: Path::new(start), obstacles: HashSet::new(), food: None }
    }

    pub fn is_out_of_bounds(&self, cell: Cell) -> bool {
        cell.x < 0 || cell.y < 0 || cell.x >= self.grid_size || cell.y >= self.grid_size
    }

    pub fn is_occupied_by_path(&self, cell: Cell) -> bool {
        self.path.contains(cell)
    }

    pub fn is_occupied_by_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Replaces the obstacle set with `count` distinct cells clear of the
    /// snake and the food. Places fewer when the grid runs out of room and
    /// returns how many were placed.
    pub fn place_obstacles<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
        attempts: usize,
    ) -> usize {
        self.obstacles.clear();

        for _ in 0..count {
            let spot = sample_free_cell(rng, self.grid_size, attempts, |c| {
                self.is_occupied_by_path(c)
                    || self.is_occupied_by_obstacle(c)
                    || self.food == Some(c)
            });

            match spot {
                Some(cell) => {
                    self.obstacles.insert(cell);
                }
                None => break,
            }
        }

        self.obstacles.len()
    }

    /// Moves the food to a random cell clear of the snake and the obstacles.
    /// Leaves no food at all when every cell is taken.
    pub fn place_food<R: Rng + ?Sized>(&mut self, rng: &mut R, attempts: usize) -> Option<Cell> {
        self.food = sample_free_cell(rng, self.grid_size, attempts, |c| {
            self.is_occupied_by_path(c) || self.is_occupied_by_obstacle(c)
        });
        self.food
    }
}

/// Rejection-samples a cell for which `occupied` is false. After `attempts`
/// misses it enumerates the free cells and picks one uniformly, so a crowded
/// grid costs one full scan instead of an unbounded loop.
pub fn sample_free_cell<R, F>(rng: &mut R, grid_size: i32, attempts: usize, occupied: F) -> Option<Cell>
where
    R: Rng + ?Sized,
    F: Fn(Cell) -> bool,
{
    for _ in 0..attempts {
        let cell = Cell::new(rng.gen_range(0..grid_size), rng.gen_range(0..grid_size));
        if !occupied(cell) {
            return Some(cell);
        }
    }

    let choices: Vec<Cell> = (0..grid_size)
        .flat_map(|y| (0..grid_size).map(move |x| Cell::new(x, y)))
        .filter(|c| !occupied(*c))
        .collect();

    choices.choose(rng).copied()
}
