use std::path::PathBuf;
use std::thread::sleep;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::Event;
use tracing::debug;

use crate::game::{Phase, Session, StepOutcome};
use crate::input::{map_key, map_pointer, Command};
use crate::render::{Canvas, Layout, Renderer};
use crate::term::Surface;
use crate::tilt::{Accelerometer, IioAccelerometer, TiltFilter, TiltInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Frame loop: every frame drains input, ticks the session at most once when
/// enough time has passed for the current speed, and redraws.
pub struct LoopDriver {
    session: Session,
    tilt: TiltInput,
    tilt_device: Option<PathBuf>,
    layout: Layout,
    renderer: Renderer,
    last_tick: Instant,
}

impl LoopDriver {
    pub fn new(session: Session, tilt_device: Option<PathBuf>, now: Instant) -> Self {
        let config = session.config();
        let tilt = TiltInput::new(TiltFilter::new(config.tilt_smoothing, config.tilt_threshold));
        let layout = Layout::compute(0, 0, config.grid_size, config.max_board_columns);

        LoopDriver { session, tilt, tilt_device, layout, renderer: Renderer, last_tick: now }
    }

    pub fn run<S: Surface>(&mut self, term: &mut S) -> Result<()> {
        let result = term.setup().and_then(|()| self.run_frames(term));
        // restore even when setup or the loop failed, then report whichever came first
        let restored = term.restore();
        result.and(restored)
    }

    fn run_frames<S: Surface>(&mut self, term: &mut S) -> Result<()> {
        let (width, height) = term.size()?;
        self.resize(width, height);
        self.last_tick = Instant::now();

        loop {
            let frame_start = Instant::now();

            for event in term.read_events_queue()? {
                if self.handle_event(event, frame_start) == Flow::Quit {
                    return Ok(());
                }
            }

            self.poll_tilt();
            self.frame(frame_start);
            term.present(&self.draw())?;

            let frame_interval = self.session.config().frame_interval;
            sleep(frame_interval.saturating_sub(frame_start.elapsed()));
        }
    }

    /// Ticks when the session is running and a tick interval has elapsed since
    /// the previous tick. Never more than one tick per call.
    pub fn frame(&mut self, now: Instant) -> StepOutcome {
        if self.session.phase() != Phase::Running {
            return StepOutcome::Idle;
        }

        if now.saturating_duration_since(self.last_tick) <= self.session.tick_interval() {
            return StepOutcome::Idle;
        }

        self.last_tick = now;
        self.session.step()
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) -> Flow {
        let command = match event {
            Event::Key(key) => match map_key(&key) {
                // the keyboard stops steering once the game is over
                Some(Command::Steer(_)) if self.session.phase() == Phase::Over => None,
                other => other,
            },
            Event::Mouse(mouse) => map_pointer(&mouse, &self.layout.controls),
            Event::Resize(width, height) => {
                self.resize(width, height);
                None
            }
            _ => None,
        };

        match command {
            Some(command) => self.apply(command, now),
            None => Flow::Continue,
        }
    }

    pub fn apply(&mut self, command: Command, now: Instant) -> Flow {
        match command {
            Command::Steer(heading) => {
                self.session.set_heading(heading);
            }
            Command::TogglePause => {
                if self.session.toggle_pause() == Phase::Running {
                    // don't count the paused time towards the next tick
                    self.last_tick = now;
                }
            }
            Command::Restart => {
                self.session.reset();
                self.last_tick = now;
            }
            Command::EnableTilt => {
                let device = self.tilt_device.clone();
                self.tilt.request(move || {
                    IioAccelerometer::open(device.as_deref()).map(|s| Box::new(s) as Box<dyn Accelerometer>)
                });
            }
            Command::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    pub fn poll_tilt(&mut self) {
        if let Some(heading) = self.tilt.poll() {
            self.session.set_heading(heading);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let config = self.session.config();
        self.layout = Layout::compute(width, height, config.grid_size, config.max_board_columns);
        debug!(width, height, cell_columns = self.layout.cell_columns, "Surface resized");
    }

    pub fn draw(&self) -> Canvas {
        self.renderer.draw(&self.layout, &self.session, self.tilt.status())
    }
}
