//! evg-runner: headless neutrino event generation.
//!
//! Usage:
//!   evg-runner --probe 14 --z 26 --a 56 --energy 3.0 --events 100 --seed 42
//!   evg-runner --energy 3.0 --splines xsec.db --create-splines --log-e
//!   evg-runner --config driver.json --keep-unphysical

use anyhow::{Context, Result};
use nuevg_core::{
    config::DriverConfig,
    event_record::Particle,
    kinematics::LorentzVector,
    pdg,
    store::SplineStore,
    EvgDriver,
};
use std::collections::BTreeMap;
use std::env;
use std::io::{self, Write};

/// One generated event, written as a JSON line on stdout.
#[derive(serde::Serialize)]
struct EventLine<'a> {
    event:       u64,
    interaction: String,
    xsec:        f64,
    weight:      f64,
    unphysical:  Option<&'a str>,
    particles:   &'a [Particle],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let probe = parse_arg(&args, "--probe", pdg::NU_MU);
    let z = parse_arg(&args, "--z", 26u32);
    let a = parse_arg(&args, "--a", 56u32);
    let energy = parse_arg(&args, "--energy", 3.0f64);
    let events = parse_arg(&args, "--events", 10u64);
    let create_splines = has_flag(&args, "--create-splines");
    let log_e = has_flag(&args, "--log-e");
    let keep_unphysical = has_flag(&args, "--keep-unphysical");
    let splines_db = string_arg(&args, "--splines");
    let list = string_arg(&args, "--list");

    let config_path = string_arg(&args, "--config");
    let mut config = match config_path {
        Some(path) => DriverConfig::load(path)?,
        None => DriverConfig::from_env(),
    };
    // A seed from the config file wins unless --seed is given.
    if config_path.is_none() || has_flag(&args, "--seed") {
        config.seed = parse_arg(&args, "--seed", 42u64);
    }
    if let Some(list) = list {
        config = config.with_generator_list(list);
    }
    if keep_unphysical {
        config.filter_unphysical = false;
    }

    let build_id = format!("build-{}", uuid::Uuid::new_v4());

    println!("nuevg: evg-runner");
    println!("  probe:     {} ({probe})", pdg::name(probe));
    println!("  target:    Z={z} A={a}");
    println!("  energy:    {energy} GeV");
    println!("  events:    {events}");
    println!("  seed:      {}", config.seed);
    println!("  list:      {}", config.resolved_list_name());
    println!("  splines:   {}", splines_db.unwrap_or("(none)"));
    println!();

    let mut driver = EvgDriver::standalone(config);
    driver
        .configure_pdg(probe, z, a)
        .with_context(|| format!("configuring driver for probe {probe} on Z={z} A={a}"))?;

    let store = match splines_db {
        Some(path) => {
            let store = SplineStore::open(path)?;
            store.migrate()?;
            let loaded = store.load_into(driver.spline_cache())?;
            log::info!("{loaded} splines loaded from {path}");
            Some(store)
        }
        None => None,
    };

    if create_splines {
        let created = driver.create_splines(log_e)?;
        log::info!("{created} splines created");
        if let Some(store) = &store {
            store.save_cache(driver.spline_cache(), &build_id)?;
        }
    } else if store.is_some() {
        driver.use_splines()?;
    }

    let range = driver.valid_energy_range()?;
    let probe_p4 = LorentzVector::along_z(energy);
    let xsec_sum = driver.xsec_sum(probe_p4)?;
    println!("{driver}");
    println!("  valid energy range: [{}, {}] GeV", range.min, range.max);
    println!("  total xsec:         {xsec_sum:.6e} GeV^-2");
    println!();

    let mut stdout = io::stdout().lock();
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut unphysical = 0u64;
    for event in 0..events {
        let record = driver.generate_event(probe_p4)?;
        let process = record.interaction().process;
        *counts
            .entry(format!("{}-{}", process.scattering.as_str(), process.current.as_str()))
            .or_default() += 1;
        if record.is_unphysical() {
            unphysical += 1;
        }
        let line = EventLine {
            event,
            interaction: record.interaction().as_key(),
            xsec: record.xsec(),
            weight: record.weight(),
            unphysical: record.unphysical_reason(),
            particles: record.particles(),
        };
        writeln!(stdout, "{}", serde_json::to_string(&line)?)?;
    }
    stdout.flush()?;

    print_summary(&driver, &build_id, events, unphysical, &counts);
    Ok(())
}

fn print_summary(
    driver: &EvgDriver,
    build_id: &str,
    events: u64,
    unphysical: u64,
    counts: &BTreeMap<String, u64>,
) {
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  build_id:       {build_id}");
    println!("  events:         {events}");
    println!("  unphysical:     {unphysical}");
    println!("  splines cached: {}", driver.spline_cache().len());
    println!("  splines in use: {}", driver.splines_enabled());
    println!();
    println!("=== PROCESS BREAKDOWN ===");
    for (process, n) in counts {
        let share = if events > 0 { 100.0 * *n as f64 / events as f64 } else { 0.0 };
        println!("  {process:<8} {n:>8} ({share:5.1}%)");
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
