use std::collections::VecDeque;

use Heading::*;

/// A discrete coordinate on the grid. Cells outside the grid are representable
/// so that a would-be head can be tested for bounds before it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn step(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        Cell::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    #[cfg(test)]
    pub const ALL: [Heading; 4] = [Up, Down, Left, Right];

    /// Unit vector of this heading; y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_reverse_of(self, other: Heading) -> bool {
        matches!(
            (self, other),
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right)
        )
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// The snake: occupied cells in travel order, head first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    body: VecDeque<Cell>,
}

impl Path {
    pub fn new(start: Cell) -> Self {
        Path { body: VecDeque::from([start]) }
    }

    #[cfg(test)]
    /// Builds a path from cells listed head first. Returns `None` for an empty
    /// list or one that intersects itself.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Option<Self> {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        let intersects = body
            .iter()
            .enumerate()
            .any(|(i, c)| body.iter().skip(i + 1).any(|other| other == c));

        if body.is_empty() || intersects {
            return None;
        }
        Some(Path { body })
    }

    pub fn head(&self) -> Cell {
        // never empty: every constructor seeds at least one cell and
        // `advance` pushes before it pops
        self.body[0]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.body.iter()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Prepends `new_head`; drops the tail unless the snake is growing this
    /// tick. Returns the dropped tail cell.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_deltas_are_unit_vectors() {
        for h in Heading::ALL {
            let (dx, dy) = h.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }

    #[test]
    fn test_reverse_headings() {
        assert!(Up.is_reverse_of(Down));
        assert!(Left.is_reverse_of(Right));
        assert!(!Up.is_reverse_of(Left));
        assert!(!Up.is_reverse_of(Up));
        for h in Heading::ALL {
            let reversed = Heading::ALL.into_iter().filter(|o| o.is_reverse_of(h)).count();
            assert_eq!(reversed, 1);
        }
    }

    #[test]
    fn test_cell_step() {
        let c = Cell::new(8, 8);
        assert_eq!(c.step(Right), Cell::new(9, 8));
        assert_eq!(c.step(Left), Cell::new(7, 8));
        assert_eq!(c.step(Up), Cell::new(8, 7));
        assert_eq!(c.step(Down), Cell::new(8, 9));
    }

    #[test]
    fn test_advance_shifts_or_grows() {
        let mut path = Path::new(Cell::new(8, 8));

        let tail = path.advance(Cell::new(9, 8), false);
        assert_eq!(tail, Some(Cell::new(8, 8)));
        assert_eq!(path.len(), 1);
        assert_eq!(path.head(), Cell::new(9, 8));

        let tail = path.advance(Cell::new(10, 8), true);
        assert_eq!(tail, None);
        assert_eq!(path.len(), 2);
        assert_eq!(
            path.cells().copied().collect::<Vec<_>>(),
            vec![Cell::new(10, 8), Cell::new(9, 8)]
        );
    }

    #[test]
    fn test_from_cells_rejects_self_intersection() {
        assert!(Path::from_cells(Vec::new()).is_none());
        assert!(Path::from_cells(vec![Cell::new(1, 1), Cell::new(1, 1)]).is_none());

        let path = Path::from_cells(vec![Cell::new(2, 1), Cell::new(1, 1)]).unwrap();
        assert_eq!(path.head(), Cell::new(2, 1));
        assert!(path.contains(Cell::new(1, 1)));
    }
}
