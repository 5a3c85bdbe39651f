//! Configuration file for the command line tools.
//!
//! ```json
//! {
//!   "credentials": {"address": "192.168.1.10", "username": "...",
//!                   "clientKey": "...", "appId": "..."},
//!   "gamut": "C",
//!   "forceFullBrightness": false,
//!   "tickRate": 50,
//!   "transport": "UDP",
//!   "transportParams": {"port": "2100"},
//!   "areas": [{"id": "...", "channels": [0, 1, 2]}]
//! }
//! ```

use crate::animation::SchedulerConfig;
use crate::control::Area;
use crate::error::DynResult;
use crate::session::{Credentials, SessionConfig};
use log::warn;
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use std::{fs, io};

pub const DEFAULT_TICK_RATE: f64 = 50.0;
pub const MIN_TICK_RATE: f64 = 0.001;
pub const MAX_TICK_RATE: f64 = 1000.0;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub credentials: Credentials,
    /// Gamut name, A to D
    pub gamut: String,
    pub force_full_brightness: bool,
    /// Frames per second
    pub tick_rate: f64,
    /// Name of a registered transport
    pub transport: String,
    pub transport_params: HashMap<String, String>,
    /// Areas served when no bridge is queried
    pub areas: Vec<Area>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            credentials: Credentials::default(),
            gamut: "C".to_string(),
            force_full_brightness: false,
            tick_rate: DEFAULT_TICK_RATE,
            transport: "default".to_string(),
            transport_params: HashMap::new(),
            areas: Vec::new(),
        }
    }
}

impl Config {
    pub fn scheduler_config(&self) -> DynResult<SchedulerConfig> {
        Ok(SchedulerConfig {
            gamut: self.gamut.parse()?,
            force_full_brightness: self.force_full_brightness,
        })
    }

    pub fn session_config(&self) -> DynResult<SessionConfig> {
        Ok(SessionConfig {
            scheduler: self.scheduler_config()?,
            transport_params: self.transport_params.clone(),
        })
    }

    /// Time between frames. Falls back to the default rate if the
    /// configured one gives no usable interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.tick_rate)
            .unwrap_or_else(|_| Duration::from_secs_f64(1.0 / DEFAULT_TICK_RATE))
    }

    fn check(&self) -> DynResult<()> {
        if !(MIN_TICK_RATE..=MAX_TICK_RATE).contains(&self.tick_rate) {
            return Err(format!("Tick rate {} out of range", self.tick_rate).into());
        }
        self.scheduler_config()?;
        for area in &self.areas {
            if area.channels.is_empty() {
                warn!("Area {} has no channels", area.id);
            }
        }
        Ok(())
    }
}

pub fn parse_config_json(json: &str) -> DynResult<Config> {
    let config: Config = serde_json::from_str(json)?;
    config.check()?;
    Ok(config)
}

pub fn read_config_json<P: AsRef<Path>>(path: P) -> DynResult<Config> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let config: Config = serde_json::from_reader(reader)?;
    config.check()?;
    Ok(config)
}
