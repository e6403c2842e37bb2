use clap::{Arg, ArgAction, ArgGroup, Command};
use std::fs;
use std::path::Path;
use std::time::Instant;

use reconstruct_core::loader::load_value_file;
use reconstruct_core::toposort::toposort_json;
use reconstruct_core::{trace, Decompiler, Options, ProducerRegistry};
use tracing::info;

fn cli() -> Command {
    Command::new("reconstruct")
        .about("Reconstruct a value document as a Python script that rebuilds it")
        .arg(
            Arg::new("value")
                .short('v')
                .long("value")
                .help("JSON value document to decompile")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("toposort")
                .long("toposort")
                .help("JSON map of node -> dependencies; prints one node per line in order")
                .value_name("FILE")
                .conflicts_with_all(["name", "inline-limit"]),
        )
        .group(
            ArgGroup::new("mode")
                .args(["value", "toposort"])
                .required(true),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .help("Preferred variable name for the root value")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("inline-limit")
                .long("inline-limit")
                .help("Largest container written in place instead of named (default: 5)")
                .value_name("N")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("out")
                .help("Write the result here instead of stdout")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .help("Log discovery and ordering to stderr")
                .action(ArgAction::SetTrue),
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
    info!(ms = started.elapsed().as_millis() as u64, exit_code, "reconstruct finished");
    std::process::exit(exit_code);
}

fn run(matches: &clap::ArgMatches) -> Result<(), String> {
    let text = if let Some(path) = matches.get_one::<String>("toposort") {
        run_toposort(Path::new(path))?
    } else if let Some(path) = matches.get_one::<String>("value") {
        let mut options = Options::default();
        if let Some(limit) = matches.get_one::<usize>("inline-limit") {
            options.inline_limit = *limit;
        }
        let name = matches.get_one::<String>("name").map(String::as_str);
        run_value(Path::new(path), name, options)?
    } else {
        return Err("one of --value or --toposort is required".to_string());
    };

    match matches.get_one::<String>("output") {
        Some(out) => {
            fs::write(out, format!("{}\n", text))
                .map_err(|e| format!("Failed to write {}: {}", out, e))?;
            eprintln!("Wrote {}", out);
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn run_value(path: &Path, name: Option<&str>, options: Options) -> Result<String, String> {
    let loaded = load_value_file(path)?;
    let mut dc = Decompiler::with_options(loaded.graph, ProducerRegistry::with_builtins(), options);
    dc.discover(loaded.root, name).map_err(|e| e.to_string())?;
    dc.render().map_err(|e| e.to_string())
}

fn run_toposort(path: &Path) -> Result<String, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let doc: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| format!("{}: invalid JSON: {}", path.display(), e))?;
    let order = toposort_json(&doc).map_err(|e| e.to_string())?;
    Ok(order.join("\n"))
}
