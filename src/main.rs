use colored::Colorize;
use std::error::Error;
use std::path::PathBuf;
use vpc_subnet_distributor::config::Settings;
use vpc_subnet_distributor::output::{plan_summary, print_partition, write_plan};
use vpc_subnet_distributor::{check_for_overlapping_subnets, partition, plan_vpc};

const USAGE: &str = "usage:
  vpc-subnet-distributor partition <base_cidr> <zone_count>
  vpc-subnet-distributor plan <name> [config.json]";

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        eprintln!("log4rs.yml not loaded, logging disabled: {e}");
    }
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let settings = Settings::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["partition", base_cidr, zone_count] => run_partition(base_cidr, zone_count),
        ["plan", name] => run_plan(&settings, name, settings.config_file.clone()),
        ["plan", name, config_file] => run_plan(&settings, name, PathBuf::from(config_file)),
        _ => {
            eprintln!("{USAGE}");
            Err("missing or unknown command".into())
        }
    };

    if let Err(e) = &result {
        log::error!("{failed}: {e}", failed = "failed".on_red());
    }
    result
}

fn run_partition(base_cidr: &str, zone_count: &str) -> Result<(), Box<dyn Error>> {
    let zone_count: usize = zone_count
        .parse()
        .map_err(|_| format!("zone count must be a positive integer, got '{zone_count}'"))?;
    let result = partition(base_cidr, zone_count)?;
    check_for_overlapping_subnets(&result)?;
    print_partition(&result, None);
    Ok(())
}

fn run_plan(settings: &Settings, name: &str, config_file: PathBuf) -> Result<(), Box<dyn Error>> {
    let (vpc, engine) = plan_vpc(name, &config_file, &settings.region)?;
    for line in plan_summary(&vpc, &engine) {
        println!("{line}");
    }
    let today = chrono::Local::now().date_naive();
    let path = write_plan(&engine, &settings.plan_file(today))?;
    println!("plan written to {}", path.display().to_string().on_blue());
    Ok(())
}
