mod collision;
mod lander_runner;
mod physics;
mod terrain;
mod world;

pub use collision::*;
pub use lander_runner::*;
pub use physics::*;
pub use terrain::*;
pub use world::*;

pub(crate) use physics::defaults as physics_defaults;
