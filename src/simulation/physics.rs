use tracing::{debug, info};

use super::World;
use crate::Error;

pub(crate) mod defaults {
    pub const G: f64 = 0.05;
    pub const FUEL: f64 = 100.;
    pub const THRUST_BURN_STEP: f64 = 0.05;
    pub const SPIN_RATE: f64 = 5.;
    pub const SPIN_BURN: f64 = 0.001;
    pub const BOUNCE_DAMPING: f64 = 0.7;
    pub const ANGULAR_DAMPING: f64 = 0.5;
    pub const REFUEL_AMOUNT: f64 = 10.;
    pub const START_X: f64 = 250.;
    pub const START_Y: f64 = 150.;
    pub const THRUST_LEVEL_MAX: i32 = 4;
    /// Engine output per thrust level, in multiples of gravity.
    pub const THRUST_FACTORS: [f64; 5] = [0., 0.9, 2.0, 5.0, 10.0];
}

/// Numeric snapshot of the vehicle.
///
/// Angles are in degrees, screen convention: 0 = nose up, 90 = nose left,
/// 180 = down, 270 = right. Velocities are world units per tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LanderState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub heading: f64,
    pub turn_rate: f64,
    pub thrust_level: i32,
    pub thrust_burn: f64,
    pub spin_burn: f64,
    pub fuel: f64,
    pub speed: f64,
    pub paused: bool,
}

impl LanderState {
    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    pub fn with_vx(self, vx: f64) -> Self {
        Self { vx, ..self }
    }

    pub fn with_vy(self, vy: f64) -> Self {
        Self { vy, ..self }
    }

    pub fn with_heading(self, heading: f64) -> Self {
        Self { heading, ..self }
    }

    pub fn with_turn_rate(self, turn_rate: f64) -> Self {
        Self { turn_rate, ..self }
    }

    pub fn with_thrust_level(self, thrust_level: i32) -> Self {
        Self {
            thrust_level,
            ..self
        }
    }

    pub fn with_fuel(self, fuel: f64) -> Self {
        Self { fuel, ..self }
    }
}

#[derive(Clone, Copy, Debug)]
enum Edge {
    Bottom,
    Top,
    Right,
    Left,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Bottom, Edge::Top, Edge::Right, Edge::Left];

    /// Past the edge and still moving away from the world.
    fn crossed(self, lander: &LanderState, world: &World) -> bool {
        match self {
            Edge::Bottom => lander.y > world.height && lander.vy > 0.,
            Edge::Top => lander.y < 0. && lander.vy < 0.,
            Edge::Right => lander.x > world.width && lander.vx > 0.,
            Edge::Left => lander.x < 0. && lander.vx < 0.,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Physics {
    pub world: World,
    g: f64,
    initial_fuel: f64,
    thrust_burn_step: f64,
    spin_rate: f64,
    spin_burn: f64,
    bounce_damping: f64,
    angular_damping: f64,
    refuel_amount: f64,
    start: (f64, f64),
    round_trig: bool,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            world: World::default(),
            g: defaults::G,
            initial_fuel: defaults::FUEL,
            thrust_burn_step: defaults::THRUST_BURN_STEP,
            spin_rate: defaults::SPIN_RATE,
            spin_burn: defaults::SPIN_BURN,
            bounce_damping: defaults::BOUNCE_DAMPING,
            angular_damping: defaults::ANGULAR_DAMPING,
            refuel_amount: defaults::REFUEL_AMOUNT,
            start: (defaults::START_X, defaults::START_Y),
            round_trig: false,
        }
    }
}

impl Physics {
    pub fn with_world(self, world: World) -> Self {
        Self { world, ..self }
    }
    pub fn with_g(self, g: f64) -> Self {
        Self { g, ..self }
    }
    pub fn with_initial_fuel(self, initial_fuel: f64) -> Self {
        Self {
            initial_fuel,
            ..self
        }
    }
    pub fn with_thrust_burn_step(self, thrust_burn_step: f64) -> Self {
        Self {
            thrust_burn_step,
            ..self
        }
    }
    pub fn with_spin_rate(self, spin_rate: f64) -> Self {
        Self { spin_rate, ..self }
    }
    pub fn with_spin_burn(self, spin_burn: f64) -> Self {
        Self { spin_burn, ..self }
    }
    pub fn with_bounce_damping(self, bounce_damping: f64) -> Self {
        Self {
            bounce_damping,
            ..self
        }
    }
    pub fn with_angular_damping(self, angular_damping: f64) -> Self {
        Self {
            angular_damping,
            ..self
        }
    }
    pub fn with_refuel_amount(self, refuel_amount: f64) -> Self {
        Self {
            refuel_amount,
            ..self
        }
    }
    pub fn with_start(self, x: f64, y: f64) -> Self {
        Self {
            start: (x, y),
            ..self
        }
    }
    /// Round the thrust direction (radians) and its cosine/sine multipliers to
    /// 3 decimals before use, reproducing the classic game's trajectories.
    pub fn with_trig_rounding(self, round_trig: bool) -> Self {
        Self { round_trig, ..self }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.world.validate()?;
        let non_negative = [
            ("gravity", self.g),
            ("initial fuel", self.initial_fuel),
            ("thrust burn step", self.thrust_burn_step),
            ("spin burn", self.spin_burn),
            ("refuel amount", self.refuel_amount),
        ];
        let unit_range = [
            ("bounce damping", self.bounce_damping),
            ("angular damping", self.angular_damping),
        ];
        let finite = [
            ("spin rate", self.spin_rate),
            ("start x", self.start.0),
            ("start y", self.start.1),
        ];

        let invalid = non_negative
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.)
            .or_else(|| {
                unit_range
                    .into_iter()
                    .find(|(_, v)| !(0. ..=1.).contains(v))
            })
            .or_else(|| finite.into_iter().find(|(_, v)| !v.is_finite()));

        match invalid {
            Some((name, value)) => Err(Error::InvalidPhysics { name, value }),
            None => Ok(()),
        }
    }

    pub fn initial_state(&self) -> LanderState {
        let (x, y) = self.start;
        LanderState {
            x,
            y,
            fuel: self.initial_fuel,
            ..LanderState::default()
        }
    }

    pub fn thrust_for(&self, thrust_level: i32) -> f64 {
        usize::try_from(thrust_level)
            .ok()
            .and_then(|level| defaults::THRUST_FACTORS.get(level))
            .map_or(0., |factor| factor * self.g)
    }

    /// One explicit Euler tick.
    pub fn iterate(&self, lander: &mut LanderState) {
        let thrust = if lander.fuel > 0. {
            self.thrust_for(lander.thrust_level)
        } else {
            0.
        };

        // rotate
        lander.heading = wrap_degrees(lander.heading + lander.turn_rate);

        // vectorize thrust
        let (t_x, t_y) = self.thrust_vector(lander.heading, thrust);
        lander.vx += t_x;
        lander.vy += t_y;

        lander.vy += self.g;

        for edge in Edge::ALL {
            if edge.crossed(lander, &self.world) {
                self.bounce_off(edge, lander);
            }
        }

        lander.speed = lander.vx.hypot(lander.vy);

        // update position
        lander.x += lander.vx;
        lander.y += lander.vy;

        // consume fuel
        let had_fuel = lander.fuel > 0.;
        lander.fuel -= lander.thrust_burn + lander.spin_burn;
        if lander.fuel < 0. {
            lander.fuel = 0.;
        }
        if had_fuel && lander.fuel == 0. {
            info!(x = lander.x, y = lander.y, "fuel exhausted");
        }
    }

    fn thrust_vector(&self, heading: f64, thrust: f64) -> (f64, f64) {
        // thrust points out of the nose, 90 degrees ahead of the x axis
        let radians = self.quantize(wrap_degrees(heading + 90.).to_radians());
        // y is negated, screen y grows downwards
        let (sin, cos) = (-radians).sin_cos();
        (thrust * self.quantize(cos), thrust * self.quantize(sin))
    }

    fn quantize(&self, value: f64) -> f64 {
        if self.round_trig {
            (value * 1000.).round() / 1000.
        } else {
            value
        }
    }

    fn bounce_off(&self, edge: Edge, lander: &mut LanderState) {
        let damping = self.bounce_damping;
        match edge {
            Edge::Bottom | Edge::Top => {
                lander.vy *= -damping;
                lander.vx *= damping;
            }
            Edge::Right | Edge::Left => {
                lander.vx *= -damping;
                lander.vy *= damping;
            }
        }
        lander.turn_rate *= self.angular_damping;
        debug!(?edge, vx = lander.vx, vy = lander.vy, "bounced off world edge");
    }
}

/// Wraps any angle into [0, 360).
pub(crate) fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360. {
        0.
    } else {
        wrapped
    }
}

/// The flight dynamics model: one vehicle, its constants, and the pilot's
/// controls.
#[derive(Clone, Debug)]
pub struct Lander {
    physics: Physics,
    state: LanderState,
}

impl Lander {
    pub fn try_new(physics: Physics) -> Result<Self, Error> {
        physics.validate()?;
        let state = physics.initial_state();
        Ok(Self { physics, state })
    }

    pub fn with_state(self, state: LanderState) -> Self {
        Self { state, ..self }
    }

    pub fn state(&self) -> &LanderState {
        &self.state
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Cycles the engine up one level; past the maximum it shuts off.
    pub fn increase_thrust(&mut self) {
        let level = self.state.thrust_level + 1;
        self.set_thrust_level(if level > defaults::THRUST_LEVEL_MAX {
            0
        } else {
            level
        });
    }

    /// Throttles down one level, stopping at zero.
    pub fn decrease_thrust(&mut self) {
        self.set_thrust_level((self.state.thrust_level - 1).max(0));
    }

    fn set_thrust_level(&mut self, thrust_level: i32) {
        self.state.thrust_level = thrust_level;
        self.state.thrust_burn = thrust_level as f64 * self.physics.thrust_burn_step;
    }

    pub fn spin_left(&mut self) {
        self.set_spin(self.physics.spin_rate, self.physics.spin_burn);
    }

    pub fn spin_right(&mut self) {
        self.set_spin(-self.physics.spin_rate, self.physics.spin_burn);
    }

    pub fn spin_stop(&mut self) {
        self.set_spin(0., 0.);
    }

    // attitude jets are dead without fuel
    fn set_spin(&mut self, turn_rate: f64, spin_burn: f64) {
        if self.state.fuel > 0. {
            self.state.turn_rate = turn_rate;
            self.state.spin_burn = spin_burn;
        }
    }

    pub fn refuel(&mut self) {
        self.state.fuel += self.physics.refuel_amount;
        debug!(fuel = self.state.fuel, "refueled");
    }

    pub fn reset_heading(&mut self) {
        self.state.heading = 0.;
    }

    pub fn toggle_pause(&mut self) {
        self.state.paused = !self.state.paused;
        info!(paused = self.state.paused, "pause toggled");
    }

    pub fn advance(&mut self) {
        self.physics.iterate(&mut self.state);
    }
}

#[cfg(test)]
mod physics_tests {
    use super::*;

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    fn assert_close(left: f64, right: f64, range: f64) {
        if (left - right).abs() > range {
            panic!("Assertion failed {left} not close to {right} within a range {range}");
        }
    }

    fn lander() -> Lander {
        Lander::try_new(Physics::default()).unwrap()
    }

    #[test]
    fn initial_state() {
        let lander = lander();
        let state = lander.state();
        assert_eq!((state.x, state.y), (250., 150.));
        assert_eq!(state.fuel, 100.);
        assert_eq!(state.thrust_level, 0);
        assert_eq!(state.heading, 0.);
        assert!(!state.paused);
    }

    #[test]
    fn thrust_table() {
        let physics = Physics::default();
        let expected = [0., 0.045, 0.1, 0.25, 0.5];
        for (level, thrust) in expected.into_iter().enumerate() {
            assert_feq(physics.thrust_for(level as i32), thrust);
        }
        assert_eq!(physics.thrust_for(5), 0.);
        assert_eq!(physics.thrust_for(-1), 0.);
    }

    #[test]
    fn increase_thrust_wraps_to_zero() {
        let mut lander = lander();
        let levels: Vec<_> = (0..12)
            .map(|_| {
                lander.increase_thrust();
                lander.state().thrust_level
            })
            .collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1, 2]);
        assert_feq(lander.state().thrust_burn, 0.1);
    }

    #[test]
    fn wrap_resets_burn_rate() {
        let mut lander = lander();
        (0..5).for_each(|_| lander.increase_thrust());
        assert_eq!(lander.state().thrust_level, 0);
        assert_eq!(lander.state().thrust_burn, 0.);
    }

    #[test]
    fn decrease_thrust_clamps_at_zero() {
        let mut lander = lander();
        for _ in 0..10 {
            lander.decrease_thrust();
            assert_eq!(lander.state().thrust_level, 0);
            assert_eq!(lander.state().thrust_burn, 0.);
        }
    }

    #[test]
    fn decrease_thrust_steps_down() {
        let mut lander = lander();
        (0..3).for_each(|_| lander.increase_thrust());
        lander.decrease_thrust();
        assert_eq!(lander.state().thrust_level, 2);
        assert_feq(lander.state().thrust_burn, 0.1);
        lander.decrease_thrust();
        lander.decrease_thrust();
        assert_eq!(lander.state().thrust_level, 0);
        assert_eq!(lander.state().thrust_burn, 0.);
    }

    #[test]
    fn spin_commands() {
        let mut lander = lander();
        lander.spin_left();
        assert_eq!(lander.state().turn_rate, 5.);
        assert_eq!(lander.state().spin_burn, 0.001);
        lander.spin_right();
        assert_eq!(lander.state().turn_rate, -5.);
        lander.spin_stop();
        assert_eq!(lander.state().turn_rate, 0.);
        assert_eq!(lander.state().spin_burn, 0.);
    }

    #[test]
    fn spin_ignored_without_fuel() {
        let mut lander = lander();
        lander.spin_left();
        let mut lander = lander.clone().with_state(lander.state().clone().with_fuel(0.));
        lander.spin_right();
        assert_eq!(lander.state().turn_rate, 5.);
        lander.spin_stop();
        assert_eq!(lander.state().turn_rate, 5.);
        assert_eq!(lander.state().spin_burn, 0.001);
    }

    #[test]
    fn free_fall() {
        let mut lander = lander();
        for _ in 0..20 {
            lander.advance();
        }
        let state = lander.state();
        assert_eq!(state.fuel, 100.);
        assert_feq(state.vy, 1.0);
        assert_eq!(state.vx, 0.);
        assert_feq(state.x, 250.);
        // sum of 0.05 * k for k in 1..=20
        assert_feq(state.y, 150. + 10.5);
        assert_feq(state.speed, 1.0);
    }

    #[test]
    fn thrust_up() {
        let mut lander = lander();
        (0..4).for_each(|_| lander.increase_thrust());
        lander.advance();
        let state = lander.state();
        assert_close(state.vx, 0., 1e-12);
        assert_feq(state.vy, 0.05 - 0.5);
        assert_feq(state.fuel, 100. - 0.2);
    }

    #[test]
    fn thrust_follows_heading() {
        let physics = Physics::default();
        let level_4 = LanderState::default()
            .with_x(500.)
            .with_y(300.)
            .with_fuel(100.)
            .with_thrust_level(4);

        // nose left pushes left
        let mut left = level_4.clone().with_heading(90.);
        physics.iterate(&mut left);
        assert_feq(left.vx, -0.5);
        assert_feq(left.vy, 0.05);

        // nose right pushes right
        let mut right = level_4.clone().with_heading(270.);
        physics.iterate(&mut right);
        assert_feq(right.vx, 0.5);
        assert_feq(right.vy, 0.05);

        // upside down pushes down
        let mut down = level_4.with_heading(180.);
        physics.iterate(&mut down);
        assert_close(down.vx, 0., 1e-12);
        assert_feq(down.vy, 0.55);
    }

    #[test]
    fn no_thrust_without_fuel() {
        let physics = Physics::default();
        let empty = LanderState::default()
            .with_x(500.)
            .with_y(300.)
            .with_heading(45.)
            .with_fuel(0.);
        let mut idle = empty.clone();
        physics.iterate(&mut idle);
        for level in 1..=4 {
            let mut burning = empty.clone().with_thrust_level(level);
            physics.iterate(&mut burning);
            assert_eq!(burning.vx, idle.vx);
            assert_eq!(burning.vy, idle.vy);
        }
    }

    #[test]
    fn fuel_consumption() {
        let mut lander = lander();
        lander.increase_thrust();
        lander.spin_left();
        lander.advance();
        assert_feq(lander.state().fuel, 100. - 0.051);
    }

    #[test]
    fn fuel_never_negative() {
        let mut lander = Lander::try_new(Physics::default().with_initial_fuel(1.)).unwrap();
        (0..4).for_each(|_| lander.increase_thrust());
        lander.spin_left();
        for _ in 0..50 {
            lander.advance();
            assert!(lander.state().fuel >= 0.);
        }
        assert_eq!(lander.state().fuel, 0.);
    }

    #[test]
    fn heading_wraps() {
        let physics = Physics::default();
        for (heading, turn_rate) in [
            (358., 5.),
            (2., -5.),
            (0., -5.),
            (355., 5.),
            (0., 725.),
            (10., -1000.),
            (-1e-15, 0.),
        ] {
            let mut state = LanderState::default()
                .with_x(500.)
                .with_y(300.)
                .with_heading(heading)
                .with_turn_rate(turn_rate);
            physics.iterate(&mut state);
            assert!(
                (0. ..360.).contains(&state.heading),
                "heading {} out of range for {heading} + {turn_rate}",
                state.heading
            );
        }
    }

    #[test]
    fn heading_wrap_values() {
        assert_feq(wrap_degrees(363.), 3.);
        assert_feq(wrap_degrees(-5.), 355.);
        assert_eq!(wrap_degrees(360.), 0.);
        assert_feq(wrap_degrees(725.), 5.);
    }

    #[test]
    fn bounce_bottom() {
        let physics = Physics::default();
        let mut state = LanderState::default()
            .with_x(500.)
            .with_y(769.)
            .with_vx(2.)
            .with_vy(5.)
            .with_turn_rate(5.);
        physics.iterate(&mut state);
        // gravity lands before the bounce
        assert_feq(state.vy, -5.05 * 0.7);
        assert_feq(state.vx, 1.4);
        assert_feq(state.turn_rate, 2.5);
        assert_feq(state.y, 769. - 3.535);
    }

    #[test]
    fn no_bounce_when_moving_back() {
        let physics = Physics::default();
        let mut state = LanderState::default()
            .with_x(500.)
            .with_y(769.)
            .with_vy(-5.)
            .with_turn_rate(5.);
        physics.iterate(&mut state);
        assert_feq(state.vy, -4.95);
        assert_eq!(state.turn_rate, 5.);
    }

    #[test]
    fn bounce_top_and_sides() {
        let physics = Physics::default();

        let mut top = LanderState::default().with_x(500.).with_y(-1.).with_vy(-5.);
        physics.iterate(&mut top);
        assert_feq(top.vy, 4.95 * 0.7);

        let mut left = LanderState::default().with_x(-1.).with_y(300.).with_vx(-3.);
        physics.iterate(&mut left);
        assert_feq(left.vx, 2.1);
        assert_feq(left.vy, 0.05 * 0.7);

        let mut right = LanderState::default().with_x(1025.).with_y(300.).with_vx(3.);
        physics.iterate(&mut right);
        assert_feq(right.vx, -2.1);
    }

    #[test]
    fn corner_bounce_damps_twice() {
        let physics = Physics::default();
        let mut state = LanderState::default()
            .with_x(1030.)
            .with_y(770.)
            .with_vx(2.)
            .with_vy(3.)
            .with_turn_rate(4.);
        physics.iterate(&mut state);
        assert_feq(state.turn_rate, 1.);
        assert_feq(state.vx, -2. * 0.7 * 0.7);
        assert_feq(state.vy, -3.05 * 0.7 * 0.7);
    }

    #[test]
    fn trig_rounding() {
        let physics = Physics::default().with_trig_rounding(true);
        let mut state = LanderState::default()
            .with_x(500.)
            .with_y(300.)
            .with_fuel(100.)
            .with_thrust_level(4);
        physics.iterate(&mut state);
        assert_eq!(state.vx, 0.);
        assert_feq(state.vy, -0.45);
    }

    #[test]
    fn session_commands() {
        let mut lander = lander();
        lander.refuel();
        assert_eq!(lander.state().fuel, 110.);

        lander.spin_left();
        lander.advance();
        assert_eq!(lander.state().heading, 5.);
        lander.reset_heading();
        assert_eq!(lander.state().heading, 0.);

        lander.toggle_pause();
        assert!(lander.state().paused);
        lander.toggle_pause();
        assert!(!lander.state().paused);
    }

    #[test]
    fn invalid_physics() {
        assert!(Lander::try_new(Physics::default().with_bounce_damping(1.5)).is_err());
        assert!(Lander::try_new(Physics::default().with_angular_damping(-0.1)).is_err());
        assert!(Lander::try_new(Physics::default().with_g(f64::NAN)).is_err());
        assert!(Lander::try_new(Physics::default().with_initial_fuel(-1.)).is_err());
        assert!(
            Lander::try_new(Physics::default().with_world(World {
                width: 0.,
                height: 768.
            }))
            .is_err()
        );
    }
}
