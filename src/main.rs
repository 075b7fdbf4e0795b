//! nexrad-l2 CLI

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use nexrad_l2::{DecodeOptions, Moment, MomentData, Volume};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn usage() -> ! {
    eprintln!("nexrad-l2 v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: nexrad-l2 [--config <file.toml>] <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info  <file>                   Show volume header, site and message counts");
    eprintln!("  scans <file>                   Show per-scan geometry and angles");
    eprintln!("  data  <file> <moment> [scan]   Summarize scaled gate values");
    eprintln!();
    eprintln!("Moments: REF VEL SW ZDR PHI RHO CFP");
    process::exit(1);
}

fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = PathBuf::from(args.remove(i + 1));
            args.remove(i);
            Some(path)
        }
        Some(_) => {
            eprintln!("--config requires a path");
            process::exit(1);
        }
        None => None,
    };

    if args.is_empty() {
        usage();
    }

    if let Err(e) = run(&args, config.as_deref()) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: &[String], config: Option<&Path>) -> Result<()> {
    let options = match config {
        Some(path) => DecodeOptions::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => DecodeOptions::default(),
    };
    init_logging(&options);

    let command = args[0].as_str();
    let Some(file) = args.get(1).map(PathBuf::from) else {
        usage();
    };

    let volume = Volume::open_with(&file, &options)
        .with_context(|| format!("Failed to decode {}", file.display()))?;

    match command {
        "info" => show_info(&volume),
        "scans" => show_scans(&volume),
        "data" => {
            let Some(name) = args.get(2) else {
                usage();
            };
            let moment: Moment = name.parse()?;
            let scan = match args.get(3) {
                Some(s) => Some(s.parse::<usize>().with_context(|| format!("Invalid scan index: {s}"))?),
                None => None,
            };
            show_data(&volume, moment, scan)
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!("Run 'nexrad-l2' for usage information.");
            process::exit(1);
        }
    }
}

fn init_logging(options: &DecodeOptions) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.log_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn show_info(volume: &Volume) -> Result<()> {
    let header = volume.header();
    println!("Station:      {}", header.icao);
    println!("Tape:         {} (extension {})", header.tape, header.extension);
    match volume.timestamp() {
        Some(ts) => println!("Created:      {}", ts.to_rfc3339()),
        None => println!("Created:      invalid ({} / {} ms)", header.date, header.time),
    }
    println!("Compression:  {:?}", volume.compression());
    println!("Radials:      {:?} ({})", volume.radial_format(), volume.nradials());

    let location = volume.location()?;
    println!(
        "Location:     {:.4}, {:.4} at {} m",
        location.latitude, location.longitude, location.height
    );

    match volume.get_vcp_pattern() {
        Some(pattern) => println!("VCP:          {pattern}"),
        None => println!("VCP:          none"),
    }
    println!("Scans:        {}", volume.nscans());

    println!();
    println!("Messages:");
    for (msg_type, count) in volume.message_counts() {
        println!("  type {msg_type:>3}: {count}");
    }
    Ok(())
}

fn show_scans(volume: &Volume) -> Result<()> {
    let infos = volume.scan_info(None)?;
    let targets = volume.get_target_angles(None).ok();
    let nyquist = volume.get_nyquist_vel(None).ok();

    for (i, (scan, info)) in volume.scans().iter().zip(&infos).enumerate() {
        let target = targets
            .as_ref()
            .and_then(|t| t.get(i))
            .map_or_else(|| "-".to_string(), |a| format!("{a:.2}"));
        let vn = nyquist
            .as_ref()
            .and_then(|v| v.get(i))
            .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));

        println!(
            "Scan {:>2}  elev #{:<2} target {:>6}  nyquist {:>6}  {} rays",
            i, scan.elevation_number, target, vn, info.nrays
        );
        for (j, moment) in info.moments.iter().enumerate() {
            println!(
                "    {:<3} {:>5} gates  first {:>6} m  spacing {:>4} m",
                moment.name(),
                info.ngates[j],
                info.first_gate[j],
                info.gate_spacing[j]
            );
        }
    }
    Ok(())
}

fn show_data(volume: &Volume, moment: Moment, scan: Option<usize>) -> Result<()> {
    let scans = scan.map(|s| vec![s]);
    let data = volume.get_data(moment, scans.as_deref(), false)?;
    let MomentData::Scaled(grid) = &data else {
        bail!("Expected scaled data");
    };

    let valid: Vec<f32> = grid.as_slice().iter().filter_map(|v| *v).collect();
    let (nrays, ngates) = grid.shape();
    println!("{moment}: {nrays} rays x {ngates} gates");
    println!(
        "  valid gates: {} of {}",
        valid.len(),
        grid.as_slice().len()
    );

    if valid.is_empty() {
        return Ok(());
    }
    let min = valid.iter().copied().fold(f32::INFINITY, f32::min);
    let max = valid.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = valid.iter().map(|&v| f64::from(v)).sum::<f64>() / valid.len() as f64;
    println!("  min {min:.2}  max {max:.2}  mean {mean:.2}");
    Ok(())
}
