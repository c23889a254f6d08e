use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

use crate::scoring;

const SPARKS: [char; 6] = ['*', '+', '✦', '✧', '·', '°'];
const COLORS: usize = 7;

/// One glyph of the completion animation
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Letters of the headline fly to a target cell and stay there
    pub target: Option<(f64, f64)>,
}

impl Particle {
    fn spark<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *SPARKS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..COLORS),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
            target: None,
        }
    }

    fn letter(from: (f64, f64), to: (f64, f64), symbol: char, color_index: usize) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: to.0 - from.0,
            vel_y: to.1 - from.1,
            symbol,
            color_index,
            age: 0.0,
            max_age: f64::INFINITY,
            target: Some(to),
        }
    }

    pub fn is_letter(&self) -> bool {
        self.target.is_some()
    }

    fn update(&mut self, dt: f64) -> bool {
        match self.target {
            Some((tx, ty)) => {
                let dist = ((tx - self.x).powi(2) + (ty - self.y).powi(2)).sqrt();
                if dist > 1.0 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                    self.vel_x *= 0.95;
                    self.vel_y *= 0.95;
                } else {
                    self.x = tx;
                    self.y = ty;
                    self.vel_x = 0.0;
                    self.vel_y = 0.0;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                // gravity
                self.vel_y += 15.0 * dt;
            }
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Headline matching how well the dish turned out
pub fn headline_for(final_score: u64) -> &'static str {
    match scoring::accuracy(final_score) {
        90.. => "MASTERCHEF!",
        60..=89 => "DELICIOUS!",
        30..=59 => "TASTY!",
        _ => "SERVED!",
    }
}

/// Particle burst shown while a finished dish waits to be reported
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    started: Instant,
    duration: Duration,
    active: bool,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new(duration: Duration) -> Self {
        Self {
            particles: Vec::new(),
            started: Instant::now(),
            duration,
            active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, width: u16, height: u16, final_score: u64) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.started = Instant::now();
        self.active = true;
        self.width = width as f64;
        self.height = height as f64;

        let center = (self.width / 2.0, self.height / 2.0);
        self.spell(headline_for(final_score), center, &mut rng);

        for _ in 0..25 {
            let x = center.0 + rng.gen_range(-15.0..15.0);
            let y = center.1 + rng.gen_range(-8.0..8.0);
            self.particles.push(Particle::spark(x, y, &mut rng));
        }
    }

    fn spell<R: Rng>(&mut self, text: &str, center: (f64, f64), rng: &mut R) {
        let spacing = 2.0;
        let span = (text.chars().count() as f64 - 1.0) * spacing;
        let left = center.0 - span / 2.0;

        for (i, ch) in text.chars().enumerate().filter(|(_, ch)| *ch != ' ') {
            let to = (left + i as f64 * spacing, center.1 - 2.0);
            let from = (
                center.0 + rng.gen_range(-10.0..10.0),
                center.1 + rng.gen_range(-5.0..5.0),
            );
            self.particles
                .push(Particle::letter(from, to, ch, rng.gen_range(0..COLORS)));
        }
    }

    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        if self.started.elapsed() >= self.duration {
            self.stop();
            return;
        }

        let dt = 0.1;
        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|p| {
            let alive = p.update(dt);
            if p.is_letter() {
                return alive;
            }
            let margin = 5.0;
            let off_screen = p.y > height + margin || p.x < -margin || p.x > width + margin;
            alive && !off_screen
        });
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.particles.clear();
    }
}
