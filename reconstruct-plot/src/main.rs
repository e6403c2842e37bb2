use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs;
use std::path::Path;
use std::time::Instant;

use reconstruct_core::trace;
use reconstruct_plot::{build_script_file, inspect_scene};
use tracing::info;

fn cli() -> Command {
    let scene_arg = Arg::new("scene")
        .help("JSON scene document")
        .value_name("SCENE")
        .required(true);

    Command::new("reconstruct-plot")
        .about("Rebuild a plot scene as a standalone Python script")
        .subcommand_required(true)
        .arg(
            Arg::new("trace")
                .long("trace")
                .help("Log discovery and ordering to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("build")
                .about("Write the script that recreates the scene")
                .arg(scene_arg.clone())
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Preferred variable name for the root value")
                        .value_name("NAME"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("out")
                        .help("Write the script here instead of stdout")
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("show")
                        .long("show")
                        .help("Append plt.show()")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Summarize the values in a scene document")
                .arg(scene_arg),
        )
}

fn main() {
    let matches = cli().get_matches();
    trace::init(matches.get_flag("trace"));

    let started = Instant::now();
    let exit_code = match run(&matches) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    info!(ms = started.elapsed().as_millis() as u64, exit_code, "reconstruct-plot finished");
    std::process::exit(exit_code);
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    match matches.subcommand() {
        Some(("build", sub)) => run_build(sub),
        Some(("inspect", sub)) => {
            let scene = sub.get_one::<String>("scene").ok_or("missing scene path")?;
            println!("{}", inspect_scene(Path::new(scene))?);
            Ok(())
        }
        _ => Err("expected a subcommand: build or inspect".to_string()),
    }
}

fn run_build(matches: &ArgMatches) -> Result<(), String> {
    let scene = matches.get_one::<String>("scene").ok_or("missing scene path")?;
    let name = matches.get_one::<String>("name").map(String::as_str);
    let script = build_script_file(Path::new(scene), name, matches.get_flag("show"))?;

    match matches.get_one::<String>("output") {
        Some(out) => {
            fs::write(out, format!("{}\n", script))
                .map_err(|e| format!("Failed to write {}: {}", out, e))?;
            eprintln!("Wrote {}", out);
        }
        None => println!("{}", script),
    }
    Ok(())
}
