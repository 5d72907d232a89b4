use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use super::World;
use crate::Error;

mod defaults {
    pub const LANDING_ZONES: usize = 2;
    /// Starting altitude as a fraction of the world height.
    pub const BASELINE: f64 = 0.85;
    pub const MIN_STEP: i32 = 40;
    pub const MAX_STEP: i32 = 100;
    pub const MAX_RISE: i32 = 100;
    pub const ZONE_MIN_X: f64 = 10.;
    pub const DRIFT_CORRECTION: f64 = 100.;
    pub const FLAT_TOLERANCE: f64 = 1e-9;
}

/// Surface polyline, left to right, screen convention (y grows downwards).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Terrain {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A maximal run of level terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingZone {
    pub x_start: f64,
    pub x_end: f64,
    pub y: f64,
}

fn is_level(a: f64, b: f64) -> bool {
    (a - b).abs() <= defaults::FLAT_TOLERANCE
}

impl Terrain {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len());
        Self { x, y }
    }

    pub fn iter_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn landing_zones(&self) -> Vec<LandingZone> {
        let mut zones = Vec::new();
        let mut start = 0;
        for i in 1..=self.y.len() {
            if i < self.y.len() && is_level(self.y[i], self.y[start]) {
                continue;
            }
            if i - start >= 2 {
                zones.push(LandingZone {
                    x_start: self.x[start],
                    x_end: self.x[i - 1],
                    y: self.y[start],
                });
            }
            start = i;
        }
        zones
    }

    fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    pub world: World,
    pub landing_zones: usize,
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            world: World::default(),
            landing_zones: defaults::LANDING_ZONES,
            seed: None,
        }
    }
}

impl TerrainSettings {
    pub fn with_world(self, world: World) -> Self {
        Self { world, ..self }
    }

    pub fn with_landing_zones(self, landing_zones: usize) -> Self {
        Self {
            landing_zones,
            ..self
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.world.validate()?;
        // every zone needs a level step plus a step to leave it
        let required = (self.landing_zones * 2) as f64 * defaults::MAX_STEP as f64;
        if self.landing_zones > 0 && self.world.width < required {
            return Err(Error::InvalidTerrain(format!(
                "world width {} too narrow for {} landing zones (needs {required})",
                self.world.width, self.landing_zones
            )));
        }
        Ok(())
    }
}

/// Builds the terrain once, on first access, and keeps it.
pub struct TerrainGenerator<R = ChaCha8Rng> {
    settings: TerrainSettings,
    rng: R,
    terrain: Option<Terrain>,
}

impl TerrainGenerator<ChaCha8Rng> {
    pub fn try_new(settings: TerrainSettings) -> Result<Self, Error> {
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::try_with_rng(settings, rng)
    }
}

impl<R: Rng> TerrainGenerator<R> {
    pub fn try_with_rng(settings: TerrainSettings, rng: R) -> Result<Self, Error> {
        settings.validate()?;
        Ok(Self {
            settings,
            rng,
            terrain: None,
        })
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn get_profile(&mut self) -> &Terrain {
        let Self {
            settings,
            rng,
            terrain,
        } = self;
        terrain.get_or_insert_with(|| generate(settings, rng))
    }

    /// The profile, if it has been generated already.
    pub fn profile(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }
}

fn generate<R: Rng>(settings: &TerrainSettings, rng: &mut R) -> Terrain {
    let World { width, height } = settings.world;

    let mut zones: Vec<f64> = (0..settings.landing_zones)
        .map(|_| rng.gen_range(defaults::ZONE_MIN_X..=width))
        .collect();
    zones.sort_by(f64::total_cmp);
    let mut zones = VecDeque::from(zones);

    let mut terrain = Terrain::default();
    let (mut x, mut y) = (0., height * defaults::BASELINE);
    terrain.push(x, y);

    let mut previous_level = false;
    loop {
        x += rng.gen_range(defaults::MIN_STEP..=defaults::MAX_STEP) as f64;

        let level = !previous_level && zones.front().is_some_and(|&zone| zone < x);
        if level {
            zones.pop_front();
        } else {
            let rise = if previous_level {
                leave_level(rng)
            } else {
                rng.gen_range(-defaults::MAX_RISE..=defaults::MAX_RISE)
            };
            y = keep_on_screen(y + rise as f64, height);
        }
        previous_level = level;

        if x >= width {
            terrain.push(width, y);
            break;
        }
        terrain.push(x, y);
    }

    if !zones.is_empty() {
        level_from_right(&mut terrain, zones.len());
    }

    info!(
        points = terrain.len(),
        landing_zones = terrain.landing_zones().len(),
        "terrain generated"
    );
    terrain
}

/// A rise that can never bring the surface back to the height it left.
fn leave_level<R: Rng>(rng: &mut R) -> i32 {
    let rise = rng.gen_range(1..defaults::MAX_RISE);
    if rng.gen_bool(0.5) {
        rise
    } else {
        -rise
    }
}

fn keep_on_screen(y: f64, height: f64) -> f64 {
    if y < 0. {
        y + defaults::DRIFT_CORRECTION
    } else if y > height {
        y - defaults::DRIFT_CORRECTION
    } else {
        y
    }
}

/// Levels off isolated segments, rightmost first, until `missing` new zones exist.
fn level_from_right(terrain: &mut Terrain, mut missing: usize) {
    let y = &mut terrain.y;
    let last = y.len() - 1;
    for i in (0..last).rev() {
        if missing == 0 {
            break;
        }
        let isolated = !is_level(y[i], y[i + 1])
            && (i == 0 || !is_level(y[i - 1], y[i]))
            && (i + 2 > last || (!is_level(y[i + 1], y[i + 2]) && !is_level(y[i], y[i + 2])));
        if isolated {
            y[i + 1] = y[i];
            missing -= 1;
        }
    }
    if missing > 0 {
        warn!(missing, "terrain too short for all landing zones");
    }
}
