use crate::Error;

mod defaults {
    pub const WIDTH: f64 = 1024.;
    pub const HEIGHT: f64 = 768.;
}

/// Bounding box of the simulated area, screen convention (y grows downwards).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct World {
    pub width: f64,
    pub height: f64,
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: defaults::WIDTH,
            height: defaults::HEIGHT,
        }
    }
}

impl World {
    pub fn try_new(width: f64, height: f64) -> Result<Self, Error> {
        let world = Self { width, height };
        world.validate()?;
        Ok(world)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let valid = |v: f64| v.is_finite() && v > 0.;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(Error::InvalidWorld {
                width: self.width,
                height: self.height,
            })
        }
    }
}
