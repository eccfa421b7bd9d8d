use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::snake::Heading::{self, *};

/// What a keyboard press, a click on an on-screen control or a tilt reading
/// asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Steer(Heading),
    TogglePause,
    Restart,
    EnableTilt,
    Quit,
}

/// Single-slot heading inbox shared by every input source.
///
/// Requests between two ticks coalesce, last writer wins. A request is dropped
/// when it reverses either the pending heading or the heading the snake
/// actually travelled on the last tick, so no sequence of requests can turn
/// the head back into the neck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingInbox {
    travelled: Heading,
    pending: Heading,
}

impl HeadingInbox {
    pub fn new(heading: Heading) -> Self {
        HeadingInbox { travelled: heading, pending: heading }
    }

    /// Returns whether the request was accepted.
    pub fn request(&mut self, heading: Heading) -> bool {
        if heading.is_reverse_of(self.pending) || heading.is_reverse_of(self.travelled) {
            return false;
        }

        self.pending = heading;
        true
    }

    /// Consumes the latest request for the upcoming tick.
    pub fn take(&mut self) -> Heading {
        self.travelled = self.pending;
        self.travelled
    }

    pub fn travelled(&self) -> Heading {
        self.travelled
    }
}

pub fn map_key(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let command = match key.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Command::Steer(Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Command::Steer(Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Command::Steer(Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Command::Steer(Right),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') | KeyCode::Esc => Command::TogglePause,
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        KeyCode::Char('t') | KeyCode::Char('T') => Command::EnableTilt,
        KeyCode::Char('q') | KeyCode::Char('Q') => Command::Quit,
        _ => return None,
    };

    Some(command)
}

/// A clickable rectangle on screen, in terminal cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub column: u16,
    pub row: u16,
    pub width: u16,
    pub label: String,
    pub command: Command,
}

impl Control {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        row == self.row && column >= self.column && column < self.column + self.width
    }
}

/// Maps a left-button press onto whichever control lies under the pointer.
pub fn map_pointer(mouse: &MouseEvent, controls: &[Control]) -> Option<Command> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }

    controls
        .iter()
        .find(|c| c.contains(mouse.column, mouse.row))
        .map(|c| c.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_reverse_request_is_rejected() {
        let mut inbox = HeadingInbox::new(Right);
        assert!(!inbox.request(Left));
        assert_eq!(inbox.take(), Right);
    }

    #[test]
    fn test_last_request_before_tick_wins() {
        let mut inbox = HeadingInbox::new(Right);
        assert!(inbox.request(Up));
        assert!(inbox.request(Right));
        assert!(inbox.request(Down));
        assert_eq!(inbox.take(), Down);
        assert_eq!(inbox.travelled(), Down);
    }

    #[test]
    fn test_cannot_sneak_a_reversal_between_ticks() {
        let mut inbox = HeadingInbox::new(Right);
        assert!(inbox.request(Up));
        // Left no longer reverses the pending Up, but it reverses the last move
        assert!(!inbox.request(Left));
        assert_eq!(inbox.take(), Up);

        assert!(inbox.request(Left));
        assert_eq!(inbox.take(), Left);
    }

    #[test]
    fn test_effective_heading_never_reverses_previous_tick() {
        let sequence = [Up, Left, Down, Right, Right, Down, Left, Up, Up, Left, Right, Down];
        let mut inbox = HeadingInbox::new(Right);
        let mut previous = inbox.travelled();

        for chunk in sequence.chunks(3) {
            for h in chunk {
                inbox.request(*h);
            }
            let now = inbox.take();
            assert!(!now.is_reverse_of(previous));
            previous = now;
        }
    }

    #[test]
    fn test_arrow_and_wasd_keys() {
        assert_eq!(map_key(&press(KeyCode::Up)), Some(Command::Steer(Up)));
        assert_eq!(map_key(&press(KeyCode::Down)), Some(Command::Steer(Down)));
        assert_eq!(map_key(&press(KeyCode::Left)), Some(Command::Steer(Left)));
        assert_eq!(map_key(&press(KeyCode::Right)), Some(Command::Steer(Right)));
        assert_eq!(map_key(&press(KeyCode::Char('w'))), Some(Command::Steer(Up)));
        assert_eq!(map_key(&press(KeyCode::Char('D'))), Some(Command::Steer(Right)));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(Command::TogglePause));
        assert_eq!(map_key(&press(KeyCode::Char(' '))), Some(Command::TogglePause));
        assert_eq!(map_key(&press(KeyCode::Char('r'))), Some(Command::Restart));
        assert_eq!(map_key(&press(KeyCode::Char('t'))), Some(Command::EnableTilt));
        assert_eq!(map_key(&press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(map_key(&press(KeyCode::Char('x'))), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut release = press(KeyCode::Up);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(&release), None);
    }

    #[test]
    fn test_pointer_hits_control() {
        let controls = vec![
            Control { column: 2, row: 10, width: 3, label: "[^]".into(), command: Command::Steer(Up) },
            Control { column: 6, row: 10, width: 9, label: "[Restart]".into(), command: Command::Restart },
        ];

        assert_eq!(map_pointer(&click(2, 10), &controls), Some(Command::Steer(Up)));
        assert_eq!(map_pointer(&click(4, 10), &controls), Some(Command::Steer(Up)));
        assert_eq!(map_pointer(&click(5, 10), &controls), None);
        assert_eq!(map_pointer(&click(14, 10), &controls), Some(Command::Restart));
        assert_eq!(map_pointer(&click(6, 11), &controls), None);

        let mut drag = click(2, 10);
        drag.kind = MouseEventKind::Drag(MouseButton::Left);
        assert_eq!(map_pointer(&drag, &controls), None);
    }
}
