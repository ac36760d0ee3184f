use gpx_track::api::formatting::{format_distance, format_speed, format_time_label};
use gpx_track::processing::photos::Photo;
use gpx_track::utils::{init_tracing, RenderConfig};
use gpx_track::TrackInstance;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Default)]
struct CliArgs {
    track_path: String,
    config_path: Option<String>,
    photos_path: Option<String>,
    position: Option<i64>,
    pretty: bool,
}

#[derive(Serialize)]
struct PositionReport {
    index: usize,
    time: String,
    lat: f64,
    lng: f64,
    camera_lat: f64,
    camera_lng: f64,
    distance: String,
    speed: String,
    gallery_offset_percent: Option<f64>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <track.json> [config.json] [--photos photos.json] [--position N] [--pretty]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let program = args.first().map_or("gpx_track", |s| s.as_str());
    let mut parsed = CliArgs::default();
    let mut positional = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--position" => {
                let value = iter.next().ok_or_else(|| usage(program))?;
                let index = value
                    .parse::<i64>()
                    .map_err(|_| format!("invalid position '{}'", value))?;
                parsed.position = Some(index);
            }
            "--photos" => {
                parsed.photos_path = Some(iter.next().ok_or_else(|| usage(program))?.clone());
            }
            "--pretty" => parsed.pretty = true,
            "-h" | "--help" => return Err(usage(program)),
            _ => positional.push(arg.clone()),
        }
    }

    match positional.len() {
        1 | 2 => {
            let mut positional = positional.into_iter();
            parsed.track_path = positional.next().unwrap_or_default();
            parsed.config_path = positional.next();
            Ok(parsed)
        }
        _ => Err(usage(program)),
    }
}

fn run(cli: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config_path {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };

    let json_data = std::fs::read_to_string(&cli.track_path)?;
    let mut instance = TrackInstance::from_json(&json_data, config)?;

    if let Some(path) = &cli.photos_path {
        let photos: Vec<Photo> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        instance = instance.with_photos(&photos);
    }

    let Some(index) = cli.position else {
        println!("{}", instance.view().to_json(cli.pretty)?);
        return Ok(());
    };

    let state = instance.set_position(index)?.clone();
    let point = &instance.track().points()[state.current_index];
    let report = PositionReport {
        index: state.current_index,
        time: format_time_label(point.timestamp),
        lat: point.lat,
        lng: point.lng,
        camera_lat: state.camera_center.lat,
        camera_lng: state.camera_center.lng,
        distance: format_distance(state.cumulative_distance),
        speed: format_speed(state.moving_average_speed_kmh),
        gallery_offset_percent: instance.gallery_strip_offset(),
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);
    Ok(())
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli) {
        error!(error = %e, "failed to render track");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
