use super::{LanderState, Terrain};

mod defaults {
    /// Sprite box the ship outline is drawn in; the vehicle position is its centre.
    pub const SHIP_SIZE: (f64, f64) = (41., 120.);
    pub const SHIP_OUTLINE: [(f64, f64); 10] = [
        (10., 45.),
        (30., 45.),
        (40., 65.),
        (30., 65.),
        (35., 75.),
        (30., 65.),
        (10., 65.),
        (5., 75.),
        (10., 65.),
        (0., 65.),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Landing {
    Safe,
    Crash,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn add(self, w: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + w.x,
            y: self.y + w.y,
        }
    }

    fn subtract(self, w: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - w.x,
            y: self.y - w.y,
        }
    }

    /// Counter-clockwise as seen on screen, where y grows downwards.
    fn rotate(self, (sin, cos): (f64, f64)) -> Vec2 {
        Vec2 {
            x: self.x * cos + self.y * sin,
            y: -self.x * sin + self.y * cos,
        }
    }
}

/// Ship outline in world coordinates at the vehicle's position and heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    points: Vec<Vec2>,
}

impl Footprint {
    pub fn of(lander: &LanderState) -> Self {
        let (width, height) = defaults::SHIP_SIZE;
        let pivot = Vec2::new(width / 2., height / 2.);
        let position = Vec2::new(lander.x, lander.y);
        let rotation = lander.heading.to_radians().sin_cos();
        let points = defaults::SHIP_OUTLINE
            .iter()
            .map(|&(x, y)| {
                Vec2::new(x, y)
                    .subtract(pivot)
                    .rotate(rotation)
                    .add(position)
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Axis aligned (min, max) corners.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        self.points.iter().fold(
            (
                Vec2::new(f64::INFINITY, f64::INFINITY),
                Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), p| {
                (
                    Vec2::new(min.x.min(p.x), min.y.min(p.y)),
                    Vec2::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        )
    }
}

/// Terrain contact capability plugged into the runner.
///
/// `detect_collision` reports whether any terrain segment touches the
/// footprint. `classify_landing` is only asked after a detected collision and
/// decides between a safe touchdown (slow, near level, fully on a flat run) and
/// a crash.
pub trait CollisionChecker {
    fn detect_collision(&self, footprint: &Footprint, terrain: &Terrain) -> bool;

    fn classify_landing(
        &self,
        footprint: &Footprint,
        terrain: &Terrain,
        lander: &LanderState,
    ) -> Landing;
}

/// Placeholder checker, the vehicle never touches the ground.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCollision;

impl CollisionChecker for NoCollision {
    fn detect_collision(&self, _: &Footprint, _: &Terrain) -> bool {
        false
    }

    fn classify_landing(&self, _: &Footprint, _: &Terrain, _: &LanderState) -> Landing {
        Landing::Crash
    }
}
