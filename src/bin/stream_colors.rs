use hue_stream::animation::AnimationCurve;
use hue_stream::color::Rgb;
use hue_stream::config::read_config_json;
use hue_stream::control::{Area, StaticControlPlane};
use hue_stream::session::{spawn_driver, StreamingSession};
use hue_stream::transport::{self, OpenError};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::time::Duration;

extern crate clap;
use clap::{value_parser, Arg, Command};

const DEFAULT_COLORS: [&str; 4] = ["FF0000", "00FF00", "0000FF", "FFFF00"];

// Time spent on each color
fn color_step(ramp: f64, hold: f64) -> Result<Duration, String> {
    if !(ramp.is_finite() && hold.is_finite() && ramp >= 0.0 && hold >= 0.0) {
        return Err(format!(
            "Ramp and hold must be finite and not negative, got {} and {}",
            ramp, hold
        ));
    }
    Duration::try_from_secs_f64(ramp + hold).map_err(|e| format!("Invalid step time: {}", e))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = transport::init() {
        error!("Failed to initialize transports: {}", e);
    }
    let matches = Command::new("stream_colors")
        .about("Fade an entertainment area through a list of colors.")
        .arg(
            Arg::new("COLORS")
                .num_args(0..)
                .value_parser(|s: &str| s.parse::<Rgb>().map_err(|e| e.to_string()))
                .help("Hex colors to cycle through"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .default_value("hue_stream.json")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("area")
                .short('a')
                .long("area")
                .help("Area id, defaults to the first configured area"),
        )
        .arg(
            Arg::new("ramp")
                .short('r')
                .long("ramp")
                .default_value("1.0")
                .value_parser(value_parser!(f64))
                .help("Fade time in seconds"),
        )
        .arg(
            Arg::new("hold")
                .long("hold")
                .default_value("0.5")
                .value_parser(value_parser!(f64))
                .help("Time in seconds to stay at each color"),
        )
        .arg(
            Arg::new("curve")
                .long("curve")
                .default_value("ease-in")
                .value_parser(|s: &str| s.parse::<AnimationCurve>().map_err(|e| e.to_string()))
                .help("Animation curve (linear, ease-in, ease-out, ease-in-out)"),
        )
        .arg(
            Arg::new("cycles")
                .short('n')
                .long("cycles")
                .default_value("1")
                .value_parser(value_parser!(u32))
                .help("Number of times to go through the colors"),
        )
        .get_matches();

    let mut colors: Vec<Rgb> = matches
        .get_many::<Rgb>("COLORS")
        .map(|c| c.copied().collect())
        .unwrap_or_default();
    if colors.is_empty() {
        colors = DEFAULT_COLORS.iter().filter_map(|c| c.parse().ok()).collect();
    }
    let ramp = *matches.get_one::<f64>("ramp").unwrap();
    let hold = *matches.get_one::<f64>("hold").unwrap();
    let step = match color_step(ramp, hold) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    let curve = matches.get_one::<AnimationCurve>("curve").unwrap().clone();
    let cycles = *matches.get_one::<u32>("cycles").unwrap();

    let config_file = matches.get_one::<String>("config").unwrap();
    let config = match read_config_json(config_file) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to read configuration file {}: {}", config_file, e);
            return;
        }
    };
    let session_config = match config.session_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    let connector = match transport::find(&config.transport) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to find transport {}: {}", config.transport, e);
            if let OpenError::NotFound = e {
                info!("Available transports:");
                for name in transport::transport_names() {
                    info!("  {}", name);
                }
            }
            return;
        }
    };
    let control = Arc::new(StaticControlPlane::new(config.areas.clone()));
    let session = Arc::new(StreamingSession::new(
        Arc::new(connector),
        control,
        session_config,
    ));

    let areas = match session.areas().await {
        Ok(a) => a,
        Err(e) => {
            error!("Failed to get areas: {}", e);
            return;
        }
    };
    let area: Area = match matches.get_one::<String>("area") {
        Some(id) => match areas.iter().find(|a| a.id == *id) {
            Some(a) => a.clone(),
            None => {
                error!("No area with id {}", id);
                return;
            }
        },
        None => areas[0].clone(),
    };

    if let Err(e) = session.connect(&config.credentials).await {
        error!("Failed to connect: {}", e);
        return;
    }
    if let Err(e) = session.start(&area).await {
        error!("Failed to start streaming: {}", e);
        if let Err(e) = session.stop().await {
            warn!("Failed to close connection: {}", e);
        }
        return;
    }
    let driver = spawn_driver(session.clone(), config.tick_interval());
    'cycles: for _ in 0..cycles {
        for color in &colors {
            info!("Fading to {:?}", color);
            if let Err(e) = session.turn_on(&[*color], ramp, curve.clone()) {
                error!("Failed to set color: {}", e);
                break 'cycles;
            }
            tokio::time::sleep(step).await;
        }
    }
    if let Err(e) = session.turn_off() {
        warn!("Failed to turn off: {}", e);
    }
    tokio::time::sleep(config.tick_interval() * 2).await;
    let frames = driver.stop().await;
    info!("{} frames sent", frames);
    if let Err(e) = session.stop().await {
        error!("Failed to stop streaming: {}", e);
    }
}

#[cfg(test)]
mod test {
    use super::color_step;
    use tokio::time::Duration;

    #[test]
    fn step_times() {
        assert_eq!(color_step(1.0, 0.5), Ok(Duration::from_millis(1500)));
        assert_eq!(color_step(0.0, 0.0), Ok(Duration::ZERO));
        assert!(color_step(f64::INFINITY, 0.5).is_err());
        assert!(color_step(1.0, f64::NAN).is_err());
        assert!(color_step(-1.0, 0.5).is_err());
        assert!(color_step(f64::MAX, f64::MAX).is_err());
    }
}
