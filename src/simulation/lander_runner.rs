use std::str::FromStr;

use tracing::{debug, info};

use crate::simulation::*;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    IncreaseThrust,
    DecreaseThrust,
    SpinLeft,
    SpinRight,
    SpinStop,
    Refuel,
    ResetHeading,
    TogglePause,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "IncreaseThrust" => Command::IncreaseThrust,
            "DecreaseThrust" => Command::DecreaseThrust,
            "SpinLeft" => Command::SpinLeft,
            "SpinRight" => Command::SpinRight,
            "SpinStop" => Command::SpinStop,
            "Refuel" => Command::Refuel,
            "ResetHeading" => Command::ResetHeading,
            "TogglePause" => Command::TogglePause,
            other => return Err(Error::Config(format!("Unknown command {other}"))),
        })
    }
}

impl Lander {
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::IncreaseThrust => self.increase_thrust(),
            Command::DecreaseThrust => self.decrease_thrust(),
            Command::SpinLeft => self.spin_left(),
            Command::SpinRight => self.spin_right(),
            Command::SpinStop => self.spin_stop(),
            Command::Refuel => self.refuel(),
            Command::ResetHeading => self.reset_heading(),
            Command::TogglePause => self.toggle_pause(),
        }
    }
}

pub trait CommandProvider {
    fn get_cmds(&self, tick: usize) -> Vec<Command>;
}

/// Commands keyed by the tick they are issued on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightScript {
    commands: Vec<(usize, Command)>,
}

impl FlightScript {
    pub fn new(mut commands: Vec<(usize, Command)>) -> Self {
        commands.sort_by_key(|(tick, _)| *tick);
        Self { commands }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, Command)> + '_ {
        self.commands.iter()
    }
}

impl CommandProvider for FlightScript {
    fn get_cmds(&self, tick: usize) -> Vec<Command> {
        self.commands
            .iter()
            .filter(|(at, _)| *at == tick)
            .map(|(_, cmd)| *cmd)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutionStatus {
    InProgress,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightState {
    Flying,
    Landed(Landing),
}

pub struct LanderRunner<C = NoCollision> {
    lander: Lander,
    terrain: TerrainGenerator,
    collision_checker: C,
    state: FlightState,
    history: LanderHistory,
    tick: usize,
}

impl<C: CollisionChecker> LanderRunner<C> {
    pub fn new(lander: Lander, terrain: TerrainGenerator, collision_checker: C) -> Self {
        let history = LanderHistory::with_initial_state(lander.state().clone());
        Self {
            lander,
            terrain,
            collision_checker,
            state: FlightState::Flying,
            history,
            tick: 0,
        }
    }

    pub fn lander(&self) -> &Lander {
        &self.lander
    }

    pub fn current_flight_state(&self) -> FlightState {
        self.state
    }

    pub fn history(&self) -> &LanderHistory {
        &self.history
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn terrain(&mut self) -> &Terrain {
        self.terrain.get_profile()
    }

    /// One tick of the control loop: commands, physics, ground contact.
    pub fn iterate(&mut self, cmd_provider: &impl CommandProvider) -> ExecutionStatus {
        if let FlightState::Landed(_) = self.state {
            return ExecutionStatus::Finished;
        }

        let tick = self.tick;
        self.tick += 1;
        for cmd in cmd_provider.get_cmds(tick) {
            debug!(tick, ?cmd, "command");
            self.lander.apply(cmd);
        }
        if self.lander.state().paused {
            return ExecutionStatus::Paused;
        }

        self.lander.advance();
        self.history.append_lander_state(self.lander.state());

        let terrain = self.terrain.get_profile();
        let footprint = Footprint::of(self.lander.state());
        if self
            .collision_checker
            .detect_collision(&footprint, terrain)
        {
            let landing =
                self.collision_checker
                    .classify_landing(&footprint, terrain, self.lander.state());
            info!(tick, ?landing, "touched down");
            self.state = FlightState::Landed(landing);
            ExecutionStatus::Finished
        } else {
            ExecutionStatus::InProgress
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LanderHistory {
    x: Vec<f64>,
    y: Vec<f64>,
    vx: Vec<f64>,
    vy: Vec<f64>,
    fuel: Vec<f64>,
    heading: Vec<f64>,
    thrust_level: Vec<i32>,
}

impl LanderHistory {
    pub fn with_initial_state(state: LanderState) -> Self {
        let mut history = Self::default();
        history.append_lander_state(&state);
        history
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn pretty_to_string(&self) -> String {
        self.iter_history().fold(
            format!(
                "{:>9}{:>9}{:>8}{:>8}{:>8}{:>8}{:>7}",
                "X", "Y", "VX", "VY", "FUEL", "HEADING", "THRUST"
            ),
            |out,
             LanderState {
                 x,
                 y,
                 vx,
                 vy,
                 fuel,
                 heading,
                 thrust_level,
                 ..
             }| {
                out + &format!(
                    "\n{x:9.2}{y:9.2}{vx:8.3}{vy:8.3}{fuel:8.2}{heading:8.1}{thrust_level:7}"
                )
            },
        )
    }

    pub fn append_lander_state(&mut self, state: &LanderState) {
        self.x.push(state.x);
        self.y.push(state.y);
        self.vx.push(state.vx);
        self.vy.push(state.vy);
        self.fuel.push(state.fuel);
        self.heading.push(state.heading);
        self.thrust_level.push(state.thrust_level);
    }

    /// Recorded states; only the fields tracked by the history are filled in.
    pub fn iter_history(&self) -> impl Iterator<Item = LanderState> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.vx)
            .zip(&self.vy)
            .zip(&self.fuel)
            .zip(&self.heading)
            .zip(&self.thrust_level)
            .map(
                |((((((x, y), vx), vy), fuel), heading), thrust_level)| LanderState {
                    x: *x,
                    y: *y,
                    vx: *vx,
                    vy: *vy,
                    fuel: *fuel,
                    heading: *heading,
                    thrust_level: *thrust_level,
                    speed: vx.hypot(*vy),
                    ..LanderState::default()
                },
            )
    }
}
