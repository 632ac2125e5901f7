use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

use sat_passes::abort::AbortSignal;
use sat_passes::config::{parse_duration, Config, ConfigError, PredictConfig};
use sat_passes::predict::{
    derive_catalog, format_coordinate, format_duration, format_instant, scan_catalog, Axis,
    GroundObserver, OrbitalElements, OrbitalParameters, ParameterDeriver, PassScanner,
    PredictError, SatellitePass, Sgp4Propagator, TimeWindow, TleLoader,
};

#[derive(Parser)]
#[command(name = "sat-passes")]
#[command(about = "Satellite pass prediction and orbit parameters from TLEs")]
struct Cli {
    /// YAML station/predict configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict passes over the ground station
    Passes(PassesArgs),
    /// Derive orbital parameters for each satellite
    Params(CatalogArgs),
    /// Check a TLE file or folder
    Validate {
        #[arg(long)]
        tle: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CatalogArgs {
    /// TLE file or folder (overrides predict.tle_folder)
    #[arg(long)]
    tle: Option<PathBuf>,
    /// Only these NORAD ids
    #[arg(long = "norad-id")]
    norad_ids: Vec<u64>,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PassesArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// "lat, lng" in degrees (overrides station.coordinates)
    #[arg(long, allow_hyphen_values = true)]
    observer: Option<String>,
    #[arg(long)]
    altitude_km: Option<f64>,
    /// RFC3339 start time, defaults to now
    #[arg(long)]
    start: Option<String>,
    /// Window length, e.g. "24h"
    #[arg(long)]
    duration: Option<String>,
    /// Sample step, e.g. "30s"
    #[arg(long)]
    step: Option<String>,
    /// Shortest pass reported, e.g. "60s"
    #[arg(long)]
    min_duration: Option<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Predict(#[from] PredictError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

#[derive(Serialize)]
struct ParametersRow<'a> {
    name: &'a str,
    norad_id: u64,
    parameters: Option<OrbitalParameters>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match load_config(cli.config) {
        Ok(config) => match cli.command {
            Commands::Passes(args) => passes(config.as_ref(), args).await,
            Commands::Params(args) => params(config.as_ref(), args),
            Commands::Validate { tle } => validate(config.as_ref(), tle),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Option<Config>, CliError> {
    path.map(|p| Config::from_file(&p))
        .transpose()
        .map_err(CliError::from)
}

fn load_catalog(config: Option<&Config>, tle: Option<PathBuf>) -> Result<TleLoader, CliError> {
    let path = tle
        .or_else(|| config.and_then(|c| c.predict.tle_folder.clone()))
        .ok_or_else(|| CliError::Usage("no TLE source: pass --tle or set predict.tle_folder".into()))?;
    let mut loader = TleLoader::new(path);
    loader.load_all()?;
    Ok(loader)
}

fn select<'a>(loader: &'a TleLoader, norad_ids: &[u64]) -> Result<Vec<&'a OrbitalElements>, CliError> {
    let selected: Vec<_> = loader
        .satellites()
        .into_iter()
        .filter(|s| norad_ids.is_empty() || norad_ids.contains(&s.norad_id))
        .collect();
    if selected.is_empty() {
        return Err(PredictError::NoSatellites.into());
    }
    Ok(selected)
}

async fn passes(config: Option<&Config>, args: PassesArgs) -> Result<(), CliError> {
    let defaults = PredictConfig::default();
    let predict = config.map(|c| &c.predict).unwrap_or(&defaults);

    let observer = match (&args.observer, config) {
        (Some(coordinates), _) => GroundObserver::from_coordinates(
            coordinates,
            Some(args.altitude_km.unwrap_or(0.0)),
        )?,
        (None, Some(config)) => match args.altitude_km {
            Some(alt) => GroundObserver::from_coordinates(&config.station.coordinates, Some(alt))?,
            None => config.observer()?,
        },
        (None, None) => {
            return Err(CliError::Usage(
                "no observer: pass --observer or set station.coordinates".into(),
            ))
        }
    };

    let start = match &args.start {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| CliError::Usage(format!("invalid --start {:?}: {}", s, e)))?,
        None => Utc::now(),
    };
    let length = match &args.duration {
        Some(d) => parse_duration(d)?,
        None => predict.window()?,
    };
    let step = match &args.step {
        Some(s) => parse_duration(s)?,
        None => predict.step()?,
    };
    let min_duration = match &args.min_duration {
        Some(s) => parse_duration(s)?,
        None => predict.min_pass_duration()?,
    };
    let window = TimeWindow::starting_at(start, length)?;

    let loader = load_catalog(config, args.catalog.tle)?;
    let satellites: Vec<OrbitalElements> = select(&loader, &args.catalog.norad_ids)?
        .into_iter()
        .cloned()
        .collect();
    let satellite_count = satellites.len();

    let scanner = Arc::new(
        PassScanner::new(Sgp4Propagator)
            .with_step(step)?
            .with_min_duration(min_duration),
    );

    let abort = AbortSignal::new();
    {
        let abort = abort.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling scan");
                abort.abort();
            }
        });
    }

    info!(
        "Scanning {} satellites from {} to {} every {} s, passes over {} s",
        satellite_count,
        format_instant(window.start()),
        format_instant(window.end()),
        scanner.step().num_seconds(),
        scanner.min_duration().num_seconds()
    );
    let passes = scan_catalog(scanner, satellites, observer, window, abort).await?;

    if args.catalog.json {
        println!("{}", serde_json::to_string_pretty(&passes)?);
    } else {
        println!("{} passes", passes.len());
        for pass in &passes {
            print_pass(pass);
        }
    }
    Ok(())
}

fn print_pass(pass: &SatellitePass) {
    println!(
        "{}  {}  {:>8}  max {:5.1}°  {} ({})",
        format_instant(pass.aos),
        format_instant(pass.los),
        format_duration(pass.duration_seconds),
        pass.max_elevation_deg,
        pass.satellite,
        pass.norad_id
    );
    println!(
        "    rise {}, {}  set {}, {}",
        format_coordinate(pass.aos_lat, Axis::Lat),
        format_coordinate(pass.aos_lng, Axis::Lng),
        format_coordinate(pass.los_lat, Axis::Lat),
        format_coordinate(pass.los_lng, Axis::Lng)
    );
}

fn params(config: Option<&Config>, args: CatalogArgs) -> Result<(), CliError> {
    let loader = load_catalog(config, args.tle)?;
    let satellites = select(&loader, &args.norad_ids)?;
    let deriver = ParameterDeriver::new(Sgp4Propagator);
    let rows = derive_catalog(&deriver, &satellites);

    if args.json {
        let rows: Vec<_> = rows
            .into_iter()
            .map(|(sat, parameters)| ParametersRow {
                name: &sat.name,
                norad_id: sat.norad_id,
                parameters,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for (sat, parameters) in rows {
        println!("{} ({})", sat.name, sat.norad_id);
        let Some(p) = parameters else {
            println!("  could not interpret elements");
            continue;
        };
        println!("  epoch            {}", format_instant(p.epoch));
        println!("  inclination      {:.4}°", p.inclination_deg);
        println!("  RAAN             {:.4}°", p.raan_deg);
        println!("  eccentricity     {:.7}", p.eccentricity);
        println!("  arg of perigee   {:.4}°", p.arg_of_perigee_deg);
        println!("  mean anomaly     {:.4}°", p.mean_anomaly_deg);
        println!("  mean motion      {:.8} rev/day", p.mean_motion_rev_per_day);
        println!("  period           {:.2} min", p.period_minutes);
        println!("  apogee           {:.1} km", p.apogee_alt_km);
        println!("  perigee          {:.1} km", p.perigee_alt_km);
        println!("  rev at epoch     {}", p.rev_number_at_epoch);
        if let (Some(lat), Some(lng), Some(alt)) = (p.epoch_lat, p.epoch_lng, p.epoch_alt_km) {
            println!(
                "  epoch position   {}, {} at {:.1} km",
                format_coordinate(lat, Axis::Lat),
                format_coordinate(lng, Axis::Lng),
                alt
            );
        }
    }
    Ok(())
}

fn validate(config: Option<&Config>, tle: Option<PathBuf>) -> Result<(), CliError> {
    let loader = load_catalog(config, tle)?;
    println!(
        "{} satellites accepted, {} records rejected",
        loader.satellites().len(),
        loader.rejected()
    );
    for sat in loader.satellites() {
        println!("  {:>6}  {}  epoch {}", sat.norad_id, sat.name, format_instant(sat.epoch()));
        println!("          {}", sat.line1);
        println!("          {}", sat.line2);
    }
    Ok(())
}
