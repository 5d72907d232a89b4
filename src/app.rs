use crate::simulation::*;
use crate::Error;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    pub physics: Physics,
    pub terrain: TerrainSettings,
    pub script: FlightScript,
}

/// Headless session: one lander over one terrain, driven by a script.
pub struct App {
    lander_runner: LanderRunner,
    script: FlightScript,
}

impl App {
    pub fn try_new(settings: Settings) -> Result<Self, Error> {
        let Settings {
            physics,
            terrain,
            script,
        } = settings;
        let lander_runner = LanderRunner::new(
            Lander::try_new(physics)?,
            TerrainGenerator::try_new(terrain)?,
            NoCollision,
        );
        Ok(Self {
            lander_runner,
            script,
        })
    }

    /// Runs up to `ticks` ticks, stopping early once the flight is over.
    pub fn run(&mut self, ticks: usize) -> ExecutionStatus {
        let mut status = ExecutionStatus::InProgress;
        for _ in 0..ticks {
            status = self.lander_runner.iterate(&self.script);
            if status == ExecutionStatus::Finished {
                break;
            }
        }
        status
    }

    pub fn get_terrain(&mut self) -> &Terrain {
        self.lander_runner.terrain()
    }

    pub fn get_history(&self) -> &LanderHistory {
        self.lander_runner.history()
    }

    pub fn get_lander_state(&self) -> &LanderState {
        self.lander_runner.lander().state()
    }

    pub fn get_flight_state(&self) -> FlightState {
        self.lander_runner.current_flight_state()
    }

    pub fn print_flight_state_results(&mut self) {
        let zones = self.get_terrain().landing_zones();
        for LandingZone { x_start, x_end, y } in zones {
            println!("Landing zone {x_start:.0}..{x_end:.0} at {y:.0}");
        }

        println!("{}", self.get_history().pretty_to_string());

        let state = self.get_lander_state();
        println!(
            "Finished {:?} after {} ticks, fuel {:.1}, speed {:.2}",
            self.get_flight_state(),
            self.lander_runner.tick(),
            state.fuel,
            state.speed
        );
    }
}
