use std::env;
use std::fs;
use std::path::PathBuf;

use formats::{RouteFormat, RouteGeometry, TripData};
use scene::{DayWording, MarkerRegistry};
use tools::build_site;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "build" => cmd_build(args),
        "check" => cmd_check(args),
        "route" => cmd_route(args),
        _ => Err(usage()),
    }
}

fn cmd_build(args: Vec<String>) -> Result<(), String> {
    // tripbook build [--strict] [site_dir]
    let mut strict = false;
    let mut rest = Vec::new();
    for arg in args {
        if arg == "--strict" {
            strict = true;
        } else {
            rest.push(arg);
        }
    }
    let site_dir = match rest.as_slice() {
        [] => PathBuf::from("."),
        [dir] => PathBuf::from(dir),
        _ => return Err(usage()),
    };

    let written = build_site(&site_dir, strict).map_err(|e| e.to_string())?;
    for path in written {
        eprintln!("generated {}", path.display());
    }
    Ok(())
}

fn cmd_check(args: Vec<String>) -> Result<(), String> {
    // tripbook check <itinerary.json>
    let [path] = args.as_slice() else {
        return Err(usage());
    };

    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let trip = TripData::from_json_str(&text).map_err(|e| e.to_string())?;
    for q in trip.quarantined() {
        eprintln!("skipped record #{}: {}", q.index, q.error);
    }

    let registry = MarkerRegistry::build(trip.days(), &DayWording::default());
    println!("{:<16} {:<32} {:>10} {:>11}", "LABEL", "NAME", "LAT", "LNG");
    for entry in registry.entries() {
        let at = entry.coordinate();
        println!(
            "{:<16} {:<32} {:>10.5} {:>11.5}",
            entry.label(),
            entry.display_name(),
            at.lat,
            at.lng
        );
    }
    eprintln!(
        "{} days, {} markers, {} skipped",
        trip.len(),
        registry.len(),
        trip.quarantined().len()
    );
    Ok(())
}

fn cmd_route(args: Vec<String>) -> Result<(), String> {
    // tripbook route <route.kml|route.geojson>
    let [path] = args.as_slice() else {
        return Err(usage());
    };

    let format = RouteFormat::from_path(path)
        .ok_or_else(|| format!("unknown route format for {path:?} (expected .kml or .geojson)"))?;
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let route = RouteGeometry::parse(&text, format).map_err(|e| e.to_string())?;

    println!("lines: {}", route.lines.len());
    println!("points: {}", route.point_count());
    println!("discarded point features: {}", route.discarded_points);
    if route.ignored_features > 0 {
        println!("ignored features: {}", route.ignored_features);
    }
    if let Some(b) = route.bounds() {
        println!(
            "bounds: [{:.5}, {:.5}] - [{:.5}, {:.5}]",
            b.south_west.lat, b.south_west.lng, b.north_east.lat, b.north_east.lng
        );
    }
    println!("length: {:.1} km", route.total_length_m() / 1000.0);
    Ok(())
}

fn usage() -> String {
    [
        "usage:",
        "  tripbook build [--strict] [site_dir]",
        "  tripbook check <itinerary.json>",
        "  tripbook route <route.kml|route.geojson>",
    ]
    .join("\n")
}
