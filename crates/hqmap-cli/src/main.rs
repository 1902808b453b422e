//! hqmap command line
//!
//! Resolves company names through the extraction pipeline and prints the
//! record together with the map focus it would produce.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use futures::future::join_all;
use hqmap_core::{Atlas, AtlasConfig, FencePolicy};
use hqmap_geo::FocusQuery;
use hqmap_record::Coordinates;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("hqmap")
        .version(hqmap_core::VERSION)
        .about("Company headquarters lookup and US map focus")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("More logging (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a company and print its record")
                .arg(Arg::new("name").required(true).help("Company name")),
        )
        .subcommand(
            Command::new("focus")
                .about("Print the viewport transform for a region and/or coordinate")
                .arg(Arg::new("code").long("code").help("Region code, e.g. CA"))
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .requires("lng")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Latitude in degrees"),
                )
                .arg(
                    Arg::new("lng")
                        .long("lng")
                        .requires("lat")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Longitude in degrees"),
                ),
        )
        .subcommand(Command::new("regions").about("List region anchors"))
        .subcommand(
            Command::new("session")
                .about("Submit several companies to one view and print each state")
                .arg(
                    Arg::new("names")
                        .required(true)
                        .num_args(1..)
                        .help("Company names, in submission order"),
                )
                .arg(
                    Arg::new("concurrent")
                        .long("concurrent")
                        .action(ArgAction::SetTrue)
                        .help("Submit all names at once instead of one after another"),
                )
                .arg(
                    Arg::new("fence")
                        .long("fence")
                        .value_parser(value_parser!(FencePolicy))
                        .help("last-write-wins or discard-stale"),
                ),
        )
}

fn init_tracing(verbosity: u8, json: bool) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn resolve(atlas: &Atlas, args: &ArgMatches) -> Result<()> {
    let name = args.get_one::<String>("name").context("missing company name")?;
    let resolution = atlas.resolve(name).await?;
    let focus = atlas.focus(FocusQuery::from(&resolution.record.location));
    print_json(&json!({
        "source": resolution.source,
        "record": resolution.record,
        "focus": focus,
        "transformOrigin": focus.transform.transform_origin_css(),
    }))
}

fn focus(atlas: &Atlas, args: &ArgMatches) -> Result<()> {
    let mut query = FocusQuery::default();
    if let Some(code) = args.get_one::<String>("code") {
        query = FocusQuery::code(code);
    }
    if let (Some(lat), Some(lng)) = (args.get_one::<f64>("lat"), args.get_one::<f64>("lng")) {
        query = query.with_coordinates(Coordinates::new(*lat, *lng)?);
    }
    let focus = atlas.focus(query);
    print_json(&json!({
        "focus": focus,
        "transformOrigin": focus.transform.transform_origin_css(),
    }))
}

fn regions(atlas: &Atlas) -> Result<()> {
    for anchor in atlas.regions() {
        println!(
            "{:<3} x={:>6.1} y={:>6.1} scale={}",
            anchor.code, anchor.x, anchor.y, anchor.scale
        );
    }
    Ok(())
}

async fn session(atlas: &Atlas, args: &ArgMatches) -> Result<()> {
    let names: Vec<&String> = args
        .get_many::<String>("names")
        .context("missing company names")?
        .collect();
    let mut controller = atlas.controller();
    if let Some(fence) = args.get_one::<FencePolicy>("fence") {
        controller = controller.with_fence(*fence);
    }

    if args.get_flag("concurrent") {
        let controller = Arc::new(controller);
        let submissions = join_all(names.iter().map(|name| {
            let controller = Arc::clone(&controller);
            async move { controller.submit(name).await }
        }))
        .await;
        for (name, submission) in names.iter().zip(submissions) {
            match submission {
                Ok(s) => println!(
                    "{name}: generation={} source={} applied={}",
                    s.generation, s.source, s.applied
                ),
                Err(e) => println!("{name}: rejected ({e})"),
            }
        }
        print_json(&controller.snapshot())?;
    } else {
        for name in names {
            match controller.submit(name).await {
                Ok(_) => print_json(&controller.snapshot())?,
                Err(e) => eprintln!("{name}: rejected ({e})"),
            }
        }
    }

    print_json(&atlas.stats())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"), matches.get_flag("log-json"));

    let config_path = matches.get_one::<PathBuf>("config");
    let config = AtlasConfig::resolve(config_path.map(PathBuf::as_path))
        .context("loading configuration")?;
    tracing::debug!(?config_path, fence = %config.view.fence, "configuration resolved");
    let atlas = Atlas::from_config(config)?;

    match matches.subcommand() {
        Some(("resolve", args)) => resolve(&atlas, args).await,
        Some(("focus", args)) => focus(&atlas, args),
        Some(("regions", _)) => regions(&atlas),
        Some(("session", args)) => session(&atlas, args).await,
        _ => Ok(()),
    }
}
