//! The frame loop.
//!
//! [`Engine`] owns everything the loop touches: the input source, the surface that
//! reports the terminal size, the framebuffer, the renderer and the clock. Nothing is
//! global, so the loop can be driven headlessly one [`step`](Engine::step) at a time.
//!
//! Each step waits for a key for at most the poll timeout:
//!
//! *   **A key arrived:** `keypress` runs and the step ends. The frame clock is not
//!     looked at, so keys can be delivered faster than frames.
//! *   **Timeout:** if a full frame interval has passed since the last frame, the size is
//!     resampled, the framebuffer cleared, `update` called and the result rendered.
//!     Otherwise nothing happens and the next step polls again.
//!
//! A key always wins over a due frame. Someone holding down a key with a fast repeat
//! rate can therefore delay frames for as long as the keys keep coming.

use crate::Game;
use crate::config::EngineConfig;
use crate::input::InputSource;
use crate::rendering::framebuffer::{Canvas, Dimensions, Framebuffer};
use crate::rendering::renderer::Renderer;
use crate::terminal::Surface;
use crate::timer::{Clock, Timer};
use log::{error, info, trace};
use std::convert::Infallible;
use std::io;
use std::io::Write;
use std::time::Duration;

/// What a single [`Engine::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// A key was read and passed to `keypress`.
    Key(u8),
    /// The poll timed out before the next frame was due.
    Idle,
    /// A frame of the given size was drawn and written.
    Frame(Dimensions),
}

/// The single-threaded scheduler tying input, drawing and output together.
pub struct Engine<I, S, W: Write, C = Timer> {
    input: I,
    surface: S,
    renderer: Renderer<W>,
    clock: C,
    framebuffer: Framebuffer,
    frame_interval_ms: u64,
    poll_timeout: Duration,
    last_frame_ms: u64,
}

impl<I: InputSource, S: Surface, W: Write, C: Clock> Engine<I, S, W, C> {
    pub fn new(config: EngineConfig, input: I, surface: S, sink: W, clock: C) -> Self {
        Self {
            input,
            surface,
            renderer: Renderer::new(sink),
            clock,
            framebuffer: Framebuffer::new(Dimensions::clamped(1, 1)),
            frame_interval_ms: config.frame_interval_ms(),
            poll_timeout: config.poll_timeout(),
            last_frame_ms: 0,
        }
    }

    /// The framebuffer as of the last frame.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<W> {
        &mut self.renderer
    }

    /// Clock reading at which the last frame started, or 0 before the first frame.
    pub fn last_frame_ms(&self) -> u64 {
        self.last_frame_ms
    }

    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    /// Runs one iteration of the loop.
    pub fn step<G: Game + ?Sized>(&mut self, game: &mut G) -> io::Result<Tick> {
        if let Some(key) = self.input.poll_key(self.poll_timeout)? {
            trace!("keypress {key:#04x}");
            game.keypress(key);
            return Ok(Tick::Key(key));
        }

        let now = self.clock.now_ms();
        if now.saturating_sub(self.last_frame_ms) < self.frame_interval_ms {
            return Ok(Tick::Idle);
        }
        self.last_frame_ms = now;

        let requested = self.surface.current_size()?;
        let dims = self.draw(game, requested)?;
        trace!("frame at {now}ms ({}x{})", dims.width, dims.height);
        Ok(Tick::Frame(dims))
    }

    fn draw<G: Game + ?Sized>(
        &mut self,
        game: &mut G,
        requested: Dimensions,
    ) -> io::Result<Dimensions> {
        self.framebuffer.resize(requested);
        self.framebuffer.clear();
        let dims = self.framebuffer.dimensions();
        game.update(dims.width, dims.height, &mut Canvas::new(&mut self.framebuffer));
        self.renderer.render(&self.framebuffer)?;
        Ok(dims)
    }

    /// Steps forever. Only returns when input or output fails.
    pub fn run<G: Game + ?Sized>(&mut self, game: &mut G) -> io::Result<Infallible> {
        info!(
            "engine loop started: one frame every {}ms, key poll {}ms",
            self.frame_interval_ms,
            self.poll_timeout.as_millis()
        );
        loop {
            if let Err(err) = self.step(game) {
                error!("engine loop stopped: {err}");
                return Err(err);
            }
        }
    }
}
