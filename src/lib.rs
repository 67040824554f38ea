#![doc = include_str!("../README.md")]

use std::convert::Infallible;
use std::io;

pub mod config;
pub mod engine;
pub mod input;
pub mod rendering;
pub mod terminal;
pub mod timer;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::input::TtyKeys;
use crate::terminal::Terminal;
use crate::timer::Timer;

pub use crate::rendering::framebuffer::{BLANK, Canvas, Dimensions, MAX_H, MAX_W};

/// The program the engine drives.
///
/// Both methods run on the engine's thread, one at a time, and must return before the
/// loop continues.
pub trait Game {
    /// Called once per frame. The canvas has just been cleared to blanks and is
    /// `width` x `height` cells; writes outside of it are ignored.
    fn update(&mut self, width: usize, height: usize, canvas: &mut Canvas<'_>);

    /// Called with the ASCII code (`1..=127`) of every key read from the keyboard,
    /// instead of a frame check for that loop iteration. NUL and non-ASCII bytes are
    /// never passed here. Does nothing by default.
    fn keypress(&mut self, key: u8) {
        let _ = key;
    }
}

impl<G: Game + ?Sized> Game for &mut G {
    fn update(&mut self, width: usize, height: usize, canvas: &mut Canvas<'_>) {
        (**self).update(width, height, canvas);
    }

    fn keypress(&mut self, key: u8) {
        (**self).keypress(key);
    }
}

impl<G: Game + ?Sized> Game for Box<G> {
    fn update(&mut self, width: usize, height: usize, canvas: &mut Canvas<'_>) {
        (**self).update(width, height, canvas);
    }

    fn keypress(&mut self, key: u8) {
        (**self).keypress(key);
    }
}

/// Adapts a pair of closures to [`Game`]. See [`run_fn`].
pub struct FnGame<U, K> {
    update: U,
    keypress: K,
}

impl<U, K> FnGame<U, K>
where
    U: FnMut(usize, usize, &mut Canvas<'_>),
    K: FnMut(u8),
{
    pub fn new(update: U, keypress: K) -> Self {
        Self { update, keypress }
    }
}

impl<U, K> Game for FnGame<U, K>
where
    U: FnMut(usize, usize, &mut Canvas<'_>),
    K: FnMut(u8),
{
    fn update(&mut self, width: usize, height: usize, canvas: &mut Canvas<'_>) {
        (self.update)(width, height, canvas);
    }

    fn keypress(&mut self, key: u8) {
        (self.keypress)(key);
    }
}

/// Takes over the terminal and runs `game` at `fps` frames per second.
///
/// Never returns `Ok`. An error means the terminal could not be set up, or keyboard or
/// screen I/O failed; the terminal mode has been restored by the time it is returned.
pub fn run<G: Game + ?Sized>(fps: u32, game: &mut G) -> io::Result<Infallible> {
    run_with_config(EngineConfig::new(fps), game)
}

/// Like [`run`], with a custom poll timeout.
pub fn run_with_config<G: Game + ?Sized>(
    config: EngineConfig,
    game: &mut G,
) -> io::Result<Infallible> {
    let timer = Timer::start();
    let terminal = Terminal::acquire()?;
    let output = terminal::frame_output()?;
    let mut engine = Engine::new(config, TtyKeys::stdin(), terminal, output, timer);
    engine.run(game)
}

/// Closure form of [`run`].
pub fn run_fn<U, K>(fps: u32, update: U, keypress: K) -> io::Result<Infallible>
where
    U: FnMut(usize, usize, &mut Canvas<'_>),
    K: FnMut(u8),
{
    run(fps, &mut FnGame::new(update, keypress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::framebuffer::Framebuffer;

    #[test]
    fn fn_game_forwards_both_callbacks() {
        let mut keys = Vec::new();
        let mut frames = 0;
        {
            let mut game = FnGame::new(
                |w, h, canvas: &mut Canvas<'_>| {
                    frames += 1;
                    canvas.put(w as i32 - 1, h as i32 - 1, '#');
                },
                |key| keys.push(key),
            );
            let mut fb = Framebuffer::new(Dimensions::clamped(2, 2));
            game.update(2, 2, &mut Canvas::new(&mut fb));
            game.keypress(b'w');
            assert_eq!(fb.get(1, 1), Some('#'));
        }
        assert_eq!(frames, 1);
        assert_eq!(keys, vec![b'w']);
    }
}
