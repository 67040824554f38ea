//! Bouncing letter demo.
//!
//! A letter flies around the terminal and bounces off the edges. WASD nudges it,
//! any letter key changes the glyph, `q` quits.

use anyhow::Context;
use rand::Rng;
use toybox::{Canvas, Game};

struct Bounce {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    glyph: char,
    frames: u64,
}

impl Bounce {
    fn new(rng: &mut impl Rng) -> Self {
        Self {
            x: rng.gen_range(0..20),
            y: rng.gen_range(0..10),
            dx: if rng.gen_bool(0.5) { 1 } else { -1 },
            dy: if rng.gen_bool(0.5) { 1 } else { -1 },
            glyph: 'A',
            frames: 0,
        }
    }
}

/// Moves one step along `pos += vel`, reflecting off `0` and `limit - 1`.
fn bounce_axis(pos: &mut i32, vel: &mut i32, limit: i32) {
    if limit <= 1 {
        *pos = 0;
        return;
    }
    *pos = (*pos).clamp(0, limit - 1);
    if *pos + *vel < 0 || *pos + *vel >= limit {
        *vel = -*vel;
    }
    *pos += *vel;
}

impl Game for Bounce {
    fn update(&mut self, width: usize, height: usize, canvas: &mut Canvas<'_>) {
        self.frames += 1;
        bounce_axis(&mut self.x, &mut self.dx, width as i32);
        bounce_axis(&mut self.y, &mut self.dy, height as i32);
        canvas.put(self.x, self.y, self.glyph);
        canvas.put_str(0, 0, &format!("frame {}  {}x{}", self.frames, width, height));
    }

    fn keypress(&mut self, key: u8) {
        match key {
            b'w' | b'W' => self.dy = -1,
            b's' | b'S' => self.dy = 1,
            b'a' | b'A' => self.dx = -1,
            b'd' | b'D' => self.dx = 1,
            b'q' | b'Q' => toybox::terminal::exit(0),
            k if k.is_ascii_alphabetic() => self.glyph = k.to_ascii_uppercase() as char,
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut game = Bounce::new(&mut rand::thread_rng());
    match toybox::run(20, &mut game).context("terminal engine stopped")? {}
}
