// src/main.rs

// Demo driver: bounces a square around an Xlib-backed virtual screen.

use anyhow::Context;
use log::{info, warn};
use std::time::Duration;
use vms::display::drivers::XlibBackend;
use vms::{Config, DisplaySession};

const SQUARE_SIDE: usize = 4;

/// Position and velocity of the bouncing square, in virtual pixels.
struct Sprite {
    x: usize,
    y: usize,
    dx: isize,
    dy: isize,
}

impl Sprite {
    fn step(&mut self, width: usize, height: usize) {
        let max_x = width.saturating_sub(SQUARE_SIDE);
        let max_y = height.saturating_sub(SQUARE_SIDE);
        if (self.x == 0 && self.dx < 0) || (self.x >= max_x && self.dx > 0) {
            self.dx = -self.dx;
        }
        if (self.y == 0 && self.dy < 0) || (self.y >= max_y && self.dy > 0) {
            self.dy = -self.dy;
        }
        self.x = self.x.saturating_add_signed(self.dx).min(max_x);
        self.y = self.y.saturating_add_signed(self.dy).min(max_y);
    }

    fn paint<B: vms::DisplayBackend>(&self, session: &mut DisplaySession<B>) {
        for y in self.y..self.y + SQUARE_SIDE {
            for x in self.x..self.x + SQUARE_SIDE {
                session.set_pixel(x, y);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting vms demo...");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration: {:?}", config);

    let mut session = DisplaySession::from_config(XlibBackend::new(), &config.screen)
        .context("Failed to open virtual screen")?;

    let mut sprite = Sprite {
        x: 0,
        y: 0,
        dx: 1,
        dy: 1,
    };
    let interval = Duration::from_millis(config.demo.frame_interval_ms);

    for frame in 0..config.demo.frames {
        session.clear().context("Failed to clear screen")?;
        sprite.paint(&mut session);
        session
            .draw()
            .with_context(|| format!("Failed to draw frame {}", frame))?;
        sprite.step(session.width(), session.height());
        std::thread::sleep(interval);
    }

    if session.bitmap().count_set() != SQUARE_SIDE * SQUARE_SIDE {
        warn!("Square clipped by the screen edge; screen smaller than the sprite?");
    }

    session.destroy();
    info!("vms demo exited successfully.");
    Ok(())
}
