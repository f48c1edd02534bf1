//! Particle network behind the admin login page.
//!
//! The simulation is kept free of any drawing so a renderer (canvas, SVG,
//! anything) only has to paint the points and the [`Link`]s each
//! [`ParticleField::step`] returns.

use rand::Rng;
use serde::Serialize;

/// Field area, in square pixels, per point.
const AREA_PER_POINT: f64 = 15_000.0;
const INITIAL_SPEED_SPREAD: f64 = 0.7;

const CURSOR_RADIUS: f64 = 200.0;
const CURSOR_LINK_OPACITY: f64 = 0.5;
const CURSOR_ATTRACTION: f64 = 0.1;
const MAX_SPEED: f64 = 1.5;

const LINK_RADIUS: f64 = 120.0;
const LINK_OPACITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Link {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub opacity: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub cursor_links: Vec<Link>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    width: f64,
    height: f64,
    points: Vec<Point>,
}

impl ParticleField {
    pub fn new(width: f64, height: f64, rng: &mut impl Rng) -> Self {
        let mut field = Self {
            width,
            height,
            points: Vec::new(),
        };
        field.resize(width, height, rng);
        field
    }

    pub fn from_points(width: f64, height: f64, points: Vec<Point>) -> Self {
        Self {
            width,
            height,
            points,
        }
    }

    pub fn point_count_for(width: f64, height: f64) -> usize {
        (width.max(0.0) * height.max(0.0) / AREA_PER_POINT).floor() as usize
    }

    /// Regenerate the points for a new field size.
    pub fn resize(&mut self, width: f64, height: f64, rng: &mut impl Rng) {
        self.width = width;
        self.height = height;
        let count = Self::point_count_for(width, height);
        self.points = (0..count)
            .map(|_| Point {
                x: rng.gen::<f64>() * width,
                y: rng.gen::<f64>() * height,
                vx: (rng.gen::<f64>() - 0.5) * INITIAL_SPEED_SPREAD,
                vy: (rng.gen::<f64>() - 0.5) * INITIAL_SPEED_SPREAD,
            })
            .collect();
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Advance one frame. `cursor` is the pointer position inside the field, if any.
    pub fn step(&mut self, cursor: Option<(f64, f64)>) -> Frame {
        let (width, height) = (self.width, self.height);
        for point in &mut self.points {
            point.x += point.vx;
            point.y += point.vy;

            if point.x < 0.0 || point.x > width {
                point.vx = -point.vx;
            }
            if point.y < 0.0 || point.y > height {
                point.vy = -point.vy;
            }

            point.x = point.x.clamp(0.0, width);
            point.y = point.y.clamp(0.0, height);
        }

        let mut frame = Frame::default();

        if let Some((cx, cy)) = cursor {
            for point in &mut self.points {
                let dist = (cx - point.x).hypot(cy - point.y);
                if dist >= CURSOR_RADIUS {
                    continue;
                }
                let closeness = 1.0 - dist / CURSOR_RADIUS;
                frame.cursor_links.push(Link {
                    from: (point.x, point.y),
                    to: (cx, cy),
                    opacity: CURSOR_LINK_OPACITY * closeness,
                });

                // a point sitting exactly on the cursor has no direction to move in
                if dist > 0.0 {
                    let force = CURSOR_ATTRACTION * closeness;
                    point.vx += (cx - point.x) * force / dist;
                    point.vy += (cy - point.y) * force / dist;
                }

                let speed = point.vx.hypot(point.vy);
                if speed > MAX_SPEED {
                    point.vx = point.vx / speed * MAX_SPEED;
                    point.vy = point.vy / speed * MAX_SPEED;
                }
            }
        }

        for (i, a) in self.points.iter().enumerate() {
            for b in &self.points[i + 1..] {
                let dist = (a.x - b.x).hypot(a.y - b.y);
                if dist < LINK_RADIUS {
                    frame.links.push(Link {
                        from: (a.x, a.y),
                        to: (b.x, b.y),
                        opacity: LINK_OPACITY * (1.0 - dist / LINK_RADIUS),
                    });
                }
            }
        }

        frame
    }
}
