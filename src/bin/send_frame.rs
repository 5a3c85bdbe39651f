use hue_stream::color::{DeviceColor, Gamut, Rgb};
use hue_stream::protocol::Frame;
use hue_stream::transport::{self, OpenError, OpenParams, SendResult, Transport};
use log::{debug, error, info};
use std::collections::BTreeMap;

extern crate clap;
use clap::{value_parser, Arg, ArgAction, Command};

// Accepts "FF0000" for the next channel or "3=FF0000" for a given one
fn parse_color_arg(arg: &str, next: u8) -> Result<(u8, Rgb), String> {
    let (channel, hex) = match arg.split_once('=') {
        Some((c, hex)) => (
            c.trim()
                .parse::<u8>()
                .map_err(|e| format!("Invalid channel \"{}\": {}", c, e))?,
            hex,
        ),
        None => (next, arg),
    };
    let rgb = hex.parse::<Rgb>().map_err(|e| e.to_string())?;
    Ok((channel, rgb))
}

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = transport::init() {
        error!("Failed to initialize transports: {}", e);
    }
    let matches = Command::new("send_frame")
        .about("Send a single streaming frame to a bridge.")
        .arg(
            Arg::new("AREA")
                .required(true)
                .help("Entertainment area id"),
        )
        .arg(
            Arg::new("COLORS")
                .required(true)
                .num_args(1..)
                .help("Hex colors, optionally prefixed with a channel, e.g. 0=FF8000"),
        )
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .default_value("127.0.0.1")
                .help("Bridge address"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_parser(value_parser!(u16))
                .help("Destination port"),
        )
        .arg(
            Arg::new("transport")
                .short('t')
                .long("transport")
                .default_value("default")
                .help("Select transport"),
        )
        .arg(
            Arg::new("gamut")
                .short('g')
                .long("gamut")
                .default_value("C")
                .value_parser(|s: &str| s.parse::<Gamut>().map_err(|e| e.to_string()))
                .help("Gamut of the lamps (A, B, C or D)"),
        )
        .arg(
            Arg::new("rgb")
                .long("rgb")
                .action(ArgAction::SetTrue)
                .help("Send RGB values instead of xy and brightness"),
        )
        .get_matches();

    let area_id = matches.get_one::<String>("AREA").unwrap();
    let gamut = *matches.get_one::<Gamut>("gamut").unwrap();
    let mut colors = BTreeMap::new();
    let mut next = 0u8;
    for arg in matches.get_many::<String>("COLORS").unwrap() {
        match parse_color_arg(arg, next) {
            Ok((channel, rgb)) => {
                colors.insert(channel, rgb);
                next = channel.wrapping_add(1);
            }
            Err(e) => {
                error!("{}", e);
                return;
            }
        }
    }
    let frame = if matches.get_flag("rgb") {
        Frame::rgb(area_id, &colors)
    } else {
        let device: BTreeMap<u8, DeviceColor> = colors
            .iter()
            .map(|(c, rgb)| (*c, DeviceColor::from_rgb(rgb, &gamut, None)))
            .collect();
        Frame::xy_brightness(area_id, &device)
    };
    let bytes = frame.to_bytes();
    debug!("Frame: {}", hex_dump(&bytes));

    let mut params = OpenParams {
        address: matches.get_one::<String>("address").unwrap().clone(),
        ..Default::default()
    };
    if let Some(port) = matches.get_one::<u16>("port") {
        params.params.insert("port".to_string(), port.to_string());
    }
    let transport_name = matches.get_one::<String>("transport").unwrap();
    let mut link = match transport::open(transport_name, params).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to open transport: {}", e);
            if let OpenError::NotFound = e {
                info!("Available transports:");
                for (name, descr) in transport::transport_descriptions() {
                    info!("  {}: {}", name, descr);
                }
            }
            return;
        }
    };
    let res = link.send(&bytes);
    link.close().await;
    match res {
        SendResult::Ok => println!("Sent {} bytes", bytes.len()),
        res => println!("Result: {}", res),
    }
}
