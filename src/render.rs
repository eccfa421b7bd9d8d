use crossterm::style::Color;

use crate::game::{Phase, Session};
use crate::input::{Command, Control};
use crate::snake::{Cell, Heading};
use crate::tilt::TiltStatus;

const SNAKE_BODY_CHAR: char = '█';
const OBSTACLE_CHAR: char = '▓';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

const SNAKE_COLOR: Color = Color::Green;
const HEAD_COLOR: Color = Color::Cyan;
const FOOD_COLOR: Color = Color::Yellow;
const OBSTACLE_COLOR: Color = Color::Red;
const TEXT_COLOR: Color = Color::White;

/// One terminal cell worth of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Color,
    pub dim: bool,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph { ch: ' ', fg: Color::Reset, dim: false };

    pub fn new(ch: char, fg: Color) -> Self {
        Glyph { ch, fg, dim: false }
    }
}

/// Off-screen frame the renderer draws into; the terminal flushes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Glyph>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Canvas { width, height, cells: vec![Glyph::BLANK; width as usize * height as usize] }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, column: u16, row: u16) -> Glyph {
        self.index(column, row).map_or(Glyph::BLANK, |i| self.cells[i])
    }

    /// Writes are clipped to the canvas.
    pub fn put(&mut self, column: u16, row: u16, glyph: Glyph) {
        if let Some(i) = self.index(column, row) {
            self.cells[i] = glyph;
        }
    }

    pub fn text(&mut self, column: u16, row: u16, text: &str, fg: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.put(column.saturating_add(i as u16), row, Glyph::new(ch, fg));
        }
    }

    #[cfg(test)]
    pub fn row_text(&self, row: u16) -> String {
        (0..self.width).map(|column| self.get(column, row).ch).collect()
    }

    fn index(&self, column: u16, row: u16) -> Option<usize> {
        if column < self.width && row < self.height {
            Some(row as usize * self.width as usize + column as usize)
        } else {
            None
        }
    }
}

/// Where everything goes on a terminal of a given size. Recomputed on every
/// resize; the cell width in columns is the only derived quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub grid_size: u16,
    pub cell_columns: u16,
    pub board_left: u16,
    pub board_top: u16,
    pub controls: Vec<Control>,
    /// Smallest terminal that fits, when the current one does not.
    pub too_small: Option<(u16, u16)>,
}

const CONTROL_LABELS: [(&str, u16, Command); 7] = [
    ("[Pause]", 8, Command::TogglePause),
    ("[Restart]", 9, Command::Restart),
    ("[Tilt]", 6, Command::EnableTilt),
    ("[<]", 3, Command::Steer(Heading::Left)),
    ("[^]", 3, Command::Steer(Heading::Up)),
    ("[v]", 3, Command::Steer(Heading::Down)),
    ("[>]", 3, Command::Steer(Heading::Right)),
];

/// Gap before the arrow controls, wider than between the others
const ARROW_GAP: u16 = 3;

fn controls_width() -> u16 {
    let labels: u16 = CONTROL_LABELS.iter().map(|(_, w, _)| *w).sum();
    labels + CONTROL_LABELS.len() as u16 - 1 + ARROW_GAP - 1
}

impl Layout {
    pub fn compute(width: u16, height: u16, grid_size: i32, max_board_columns: u16) -> Self {
        let grid = u16::try_from(grid_size).unwrap_or(u16::MAX);
        let available = width.min(max_board_columns).saturating_sub(2);
        let cell_columns = (available / grid.max(1)).max(1);

        let board_width = grid.saturating_mul(cell_columns).saturating_add(2);
        let content_width = board_width.max(controls_width());
        // score line, board with borders, controls line
        let content_height = grid.saturating_add(4);

        let mut layout = Layout {
            width,
            height,
            grid_size: grid,
            cell_columns,
            board_left: 0,
            board_top: 0,
            controls: Vec::new(),
            too_small: None,
        };

        if width < content_width || height < content_height {
            layout.too_small = Some((content_width, content_height));
            return layout;
        }

        let left = (width - content_width) / 2;
        let top = (height - content_height) / 2;
        layout.board_left = left + (content_width - board_width) / 2;
        layout.board_top = top + 1;

        let controls_row = top + content_height - 1;
        let mut column = left + (content_width - controls_width()) / 2;
        for (label, w, command) in CONTROL_LABELS {
            if matches!(command, Command::Steer(Heading::Left)) {
                column += ARROW_GAP - 1;
            }
            layout.controls.push(Control { column, row: controls_row, width: w, label: label.to_string(), command });
            column += w + 1;
        }

        layout
    }

    pub fn board_width(&self) -> u16 {
        self.grid_size * self.cell_columns + 2
    }

    /// Terminal position of the first column of a grid cell.
    pub fn cell_origin(&self, cell: Cell) -> (u16, u16) {
        (
            self.board_left + 1 + cell.x as u16 * self.cell_columns,
            self.board_top + 1 + cell.y as u16,
        )
    }
}

/// Draws a session; reads only.
pub struct Renderer;

impl Renderer {
    pub fn draw(&self, layout: &Layout, session: &Session, tilt: TiltStatus) -> Canvas {
        let mut canvas = Canvas::new(layout.width, layout.height);

        if let Some((w, h)) = layout.too_small {
            let lines = [
                "Terminal too small".to_string(),
                format!("need {}x{}, have {}x{}", w, h, layout.width, layout.height),
            ];
            self.banner(&mut canvas, layout.height / 2, layout.width, &lines);
            return canvas;
        }

        self.draw_status(&mut canvas, layout, session, tilt);
        self.draw_borders(&mut canvas, layout);
        self.draw_world(&mut canvas, layout, session);

        match session.phase() {
            Phase::Paused => self.overlay(&mut canvas, layout, &["PAUSE"]),
            Phase::Over => self.overlay(&mut canvas, layout, &["Game Over", "Press R to restart"]),
            Phase::Running => {}
        }

        self.draw_controls(&mut canvas, layout, session.phase());
        canvas
    }

    fn draw_status(&self, canvas: &mut Canvas, layout: &Layout, session: &Session, tilt: TiltStatus) {
        let tilt = match tilt {
            TiltStatus::Off => "off",
            TiltStatus::On => "on",
            TiltStatus::Lost => "lost",
            TiltStatus::Unavailable => "unavailable",
        };
        let line = format!(
            "Score: {}  Length: {}  Speed: {:.2}  Tilt: {}",
            session.score(),
            session.world().path.len(),
            session.speed(),
            tilt
        );
        canvas.text(layout.board_left, layout.board_top - 1, &line, TEXT_COLOR);
    }

    fn draw_borders(&self, canvas: &mut Canvas, layout: &Layout) {
        let left = layout.board_left;
        let right = left + layout.board_width() - 1;
        let top = layout.board_top;
        let bottom = top + layout.grid_size + 1;

        for x in left..=right {
            let ch = if x == left || x == right { '+' } else { '-' };
            canvas.put(x, top, Glyph::new(ch, TEXT_COLOR));
            canvas.put(x, bottom, Glyph::new(ch, TEXT_COLOR));
        }

        for y in top + 1..bottom {
            canvas.put(left, y, Glyph::new('|', TEXT_COLOR));
            canvas.put(right, y, Glyph::new('|', TEXT_COLOR));
        }
    }

    fn draw_world(&self, canvas: &mut Canvas, layout: &Layout, session: &Session) {
        let world = session.world();

        for obstacle in &world.obstacles {
            self.fill_cell(canvas, layout, *obstacle, Glyph::new(OBSTACLE_CHAR, OBSTACLE_COLOR));
        }

        if let Some(food) = world.food {
            self.fill_cell(canvas, layout, food, Glyph::new(FOOD_CHAR, FOOD_COLOR));
        }

        let dead = session.phase() == Phase::Over;
        for (i, cell) in world.path.cells().enumerate() {
            let glyph = match (dead, i) {
                (true, _) => Glyph::new(DEAD_SNAKE_CHAR, SNAKE_COLOR),
                (false, 0) => Glyph::new(session.heading().head_char(), HEAD_COLOR),
                (false, _) => Glyph::new(SNAKE_BODY_CHAR, SNAKE_COLOR),
            };
            self.fill_cell(canvas, layout, *cell, glyph);
        }
    }

    fn fill_cell(&self, canvas: &mut Canvas, layout: &Layout, cell: Cell, glyph: Glyph) {
        let (column, row) = layout.cell_origin(cell);
        for dx in 0..layout.cell_columns {
            canvas.put(column + dx, row, glyph);
        }
    }

    /// Dims the board and prints `lines` across its middle.
    fn overlay(&self, canvas: &mut Canvas, layout: &Layout, lines: &[&str]) {
        let top = layout.board_top;
        for row in top..=top + layout.grid_size + 1 {
            for column in layout.board_left..layout.board_left + layout.board_width() {
                let mut glyph = canvas.get(column, row);
                glyph.dim = true;
                canvas.put(column, row, glyph);
            }
        }

        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        let middle = top + 1 + layout.grid_size / 2;
        let row = middle.saturating_sub(lines.len() as u16 / 2);
        self.banner_at(canvas, row, layout.board_left, layout.board_width(), &lines);
    }

    fn banner(&self, canvas: &mut Canvas, row: u16, width: u16, lines: &[String]) {
        self.banner_at(canvas, row, 0, width, lines);
    }

    /// Centers each line horizontally within `left..left + width`.
    fn banner_at(&self, canvas: &mut Canvas, row: u16, left: u16, width: u16, lines: &[String]) {
        for (i, line) in lines.iter().enumerate() {
            let padded = format!(" {} ", line);
            let len = padded.chars().count() as u16;
            let column = left + width.saturating_sub(len) / 2;
            canvas.text(column, row + i as u16, &padded, TEXT_COLOR);
        }
    }

    fn draw_controls(&self, canvas: &mut Canvas, layout: &Layout, phase: Phase) {
        for control in &layout.controls {
            let label = match (control.command, phase) {
                (Command::TogglePause, Phase::Paused) => "[Resume]",
                _ => control.label.as_str(),
            };
            canvas.text(control.column, control.row, label, TEXT_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session {
        Session::new(GameConfig::default(), StdRng::seed_from_u64(11))
    }

    fn full_layout() -> Layout {
        Layout::compute(100, 40, 30, 62)
    }

    #[test]
    fn test_layout_derives_cell_width() {
        let wide = full_layout();
        assert_eq!(wide.too_small, None);
        assert_eq!(wide.cell_columns, 2);
        assert_eq!(wide.board_width(), 62);

        let narrow = Layout::compute(50, 40, 30, 62);
        assert_eq!(narrow.too_small, None);
        assert_eq!(narrow.cell_columns, 1);

        // the cap keeps a huge terminal from stretching the board
        let huge = Layout::compute(400, 100, 30, 62);
        assert_eq!(huge.cell_columns, 2);
    }

    #[test]
    fn test_layout_reports_small_terminal() {
        let layout = Layout::compute(30, 20, 30, 62);
        assert_eq!(layout.too_small, Some((43, 34)));
        assert!(layout.controls.is_empty());

        let canvas = Renderer.draw(&layout, &session(), TiltStatus::Off);
        assert!(canvas.row_text(10).contains("Terminal too small"));
    }

    #[test]
    fn test_controls_do_not_overlap() {
        let layout = full_layout();
        assert_eq!(layout.controls.len(), 7);
        for pair in layout.controls.windows(2) {
            assert!(pair[0].column + pair[0].width < pair[1].column);
            assert_eq!(pair[0].row, pair[1].row);
        }
        assert!(layout.controls[0].row > layout.board_top + layout.grid_size + 1);
    }

    #[test]
    fn test_draws_head_food_and_obstacles() {
        let layout = full_layout();
        let s = session();
        let canvas = Renderer.draw(&layout, &s, TiltStatus::Off);

        let (col, row) = layout.cell_origin(Cell::new(8, 8));
        assert_eq!(canvas.get(col, row), Glyph::new('>', HEAD_COLOR));
        assert_eq!(canvas.get(col + 1, row), Glyph::new('>', HEAD_COLOR));

        let (col, row) = layout.cell_origin(s.world().food.unwrap());
        assert_eq!(canvas.get(col, row).ch, FOOD_CHAR);

        for obstacle in &s.world().obstacles {
            let (col, row) = layout.cell_origin(*obstacle);
            assert_eq!(canvas.get(col, row).ch, OBSTACLE_CHAR);
        }

        let status = canvas.row_text(layout.board_top - 1);
        assert!(status.contains("Score: 0"));
        assert!(status.contains("Speed: 6.00"));
        assert!(status.contains("Tilt: off"));
    }

    #[test]
    fn test_pause_banner_dims_board() {
        let layout = full_layout();
        let mut s = session();
        s.toggle_pause();
        let canvas = Renderer.draw(&layout, &s, TiltStatus::On);

        let middle = layout.board_top + 1 + layout.grid_size / 2;
        assert!(canvas.row_text(middle).contains("PAUSE"));
        assert!(canvas.get(layout.board_left, layout.board_top).dim);
        assert!(canvas.row_text(layout.controls[0].row).contains("[Resume]"));
        assert!(canvas.row_text(layout.board_top - 1).contains("Tilt: on"));
    }

    #[test]
    fn test_game_over_banner() {
        let layout = full_layout();
        let mut s = session();
        // steer into the top wall
        s.set_heading(Heading::Up);
        while s.phase() == Phase::Running {
            s.step();
        }

        let canvas = Renderer.draw(&layout, &s, TiltStatus::Off);
        let board: String = (layout.board_top..layout.board_top + layout.grid_size + 2)
            .map(|row| canvas.row_text(row))
            .collect();
        assert!(board.contains("Game Over"));
        assert!(board.contains("Press R to restart"));
        assert!(!canvas.row_text(layout.controls[0].row).contains("[Resume]"));
    }

    #[test]
    fn test_canvas_clips_writes() {
        let mut canvas = Canvas::new(4, 2);
        canvas.text(2, 0, "abcdef", TEXT_COLOR);
        canvas.put(9, 9, Glyph::new('z', TEXT_COLOR));

        assert_eq!(canvas.row_text(0), "  ab");
        assert_eq!(canvas.get(9, 9), Glyph::BLANK);
    }
}
