use std::{fs, path::Path};

use json::{self, JsonValue};

use crate::simulation::*;
use crate::{Error, Settings};

macro_rules! get_json_or {
    ($json:ident, $($key:literal),+; $func:ident, $default:expr) => {{
        let value = &$json$([$key])+;
        if value.is_null() {
            $default
        } else {
            value.$func().ok_or_else(|| {
                Error::Config(concat!("Invalid value at ", $("/", $key),+).to_owned())
            })?
        }
    }};
}

pub fn parse_settings<P: AsRef<Path>>(settings_file_path: P) -> Result<Settings, Error> {
    settings_from_json(&read_json(settings_file_path.as_ref())?)
}

pub fn parse_from_string(settings: &str) -> Result<Settings, Error> {
    settings_from_json(&json::parse(settings)?)
}

fn read_json(file_path: &Path) -> Result<JsonValue, Error> {
    let file_content = fs::read_to_string(file_path).map_err(|source| Error::Io {
        path: file_path.display().to_string(),
        source,
    })?;
    Ok(json::parse(&file_content)?)
}

fn settings_from_json(json: &JsonValue) -> Result<Settings, Error> {
    if !json.is_object() {
        return Err(Error::Config("Settings have to be a json object".to_owned()));
    }
    let world = parse_world(json)?;
    Ok(Settings {
        physics: parse_physics(json)?.with_world(world),
        terrain: parse_terrain(json)?.with_world(world),
        script: parse_script(json)?,
    })
}

fn parse_world(json: &JsonValue) -> Result<World, Error> {
    let default = World::default();
    World::try_new(
        get_json_or!(json, "World", "Width"; as_f64, default.width),
        get_json_or!(json, "World", "Height"; as_f64, default.height),
    )
}

fn parse_physics(json: &JsonValue) -> Result<Physics, Error> {
    use crate::simulation::physics_defaults as defaults;

    Ok(Physics::default()
        .with_g(get_json_or!(json, "Physics", "Gravity"; as_f64, defaults::G))
        .with_initial_fuel(get_json_or!(json, "Physics", "InitialFuel"; as_f64, defaults::FUEL))
        .with_thrust_burn_step(get_json_or!(
            json, "Physics", "ThrustBurnStep"; as_f64, defaults::THRUST_BURN_STEP
        ))
        .with_spin_rate(get_json_or!(json, "Physics", "SpinRate"; as_f64, defaults::SPIN_RATE))
        .with_spin_burn(get_json_or!(json, "Physics", "SpinBurn"; as_f64, defaults::SPIN_BURN))
        .with_bounce_damping(get_json_or!(
            json, "Physics", "BounceDamping"; as_f64, defaults::BOUNCE_DAMPING
        ))
        .with_angular_damping(get_json_or!(
            json, "Physics", "AngularDamping"; as_f64, defaults::ANGULAR_DAMPING
        ))
        .with_refuel_amount(get_json_or!(
            json, "Physics", "RefuelAmount"; as_f64, defaults::REFUEL_AMOUNT
        ))
        .with_trig_rounding(get_json_or!(json, "Physics", "RoundTrig"; as_bool, false))
        .with_start(
            get_json_or!(json, "Lander", "X"; as_f64, defaults::START_X),
            get_json_or!(json, "Lander", "Y"; as_f64, defaults::START_Y),
        ))
}

fn parse_terrain(json: &JsonValue) -> Result<TerrainSettings, Error> {
    let mut settings = TerrainSettings::default().with_landing_zones(get_json_or!(
        json, "Terrain", "LandingZones"; as_usize, TerrainSettings::default().landing_zones
    ));
    if !json["Terrain"]["Seed"].is_null() {
        settings = settings.with_seed(get_json_or!(json, "Terrain", "Seed"; as_u64, 0));
    }
    Ok(settings)
}

fn parse_script(json: &JsonValue) -> Result<FlightScript, Error> {
    let script = &json["Script"];
    if script.is_null() {
        return Ok(FlightScript::default());
    }
    if !script.is_array() {
        return Err(Error::Config("Script has to be an array".to_owned()));
    }
    script
        .members()
        .map(|entry| -> Result<(usize, Command), Error> {
            let err = || Error::Config("Script entries have to be [tick, command] pairs".to_owned());
            let tick = entry[0].as_usize().ok_or_else(err)?;
            let cmd = entry[1].as_str().ok_or_else(err)?.parse::<Command>()?;
            Ok((tick, cmd))
        })
        .collect::<Result<Vec<_>, Error>>()
        .map(FlightScript::new)
}
