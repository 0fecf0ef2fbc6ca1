use std::process::exit;

use env_logger::{Builder, Env};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use twophase::solver::{Config, Solver};
use twophase::{facelet, moves, CubieCube, SolveError};

fn usage(opts: &getopts::Options) -> String {
    opts.usage("Usage: twophase [options]\n\nSolve a 3x3x3 cube with the two-phase algorithm.")
}

fn main() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(env_logger::Target::Stderr);
    builder.format_timestamp_millis();
    builder.init();

    let args: Vec<String> = std::env::args().collect();

    let mut opts = getopts::Options::new();
    opts.optopt("", "facelets", "cube definition string (54 facelets)", "FACELETS");
    opts.optopt("", "scramble", "maneuver to apply to the solved cube and solve", "MOVES");
    opts.optopt("", "random", "generate and solve a random scramble of N moves", "N");
    opts.optopt("", "seed", "random seed for --random", "SEED");
    opts.optopt("", "threads", "worker threads, 0 = all cores minus one", "N");
    opts.optopt("", "timeout-ms", "search budget in milliseconds", "MS");
    opts.optopt("", "max-length", "hard cap on solution length", "N");
    opts.optopt("", "num-solutions", "improving solutions to collect", "N");
    opts.optopt("", "splits", "phase-1 first-move partitions, 0 = threads", "N");
    opts.optflag("", "json", "print the full solve report as JSON");
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", usage(&opts));
            exit(2);
        }
    };
    if matches.opt_present("help") {
        println!("{}", usage(&opts));
        return;
    }

    let parse_num = |name: &str, default: usize| -> usize {
        matches
            .opt_str(name)
            .map(|v| match v.parse::<usize>() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("--{name} expects a number, got `{v}`");
                    exit(2);
                }
            })
            .unwrap_or(default)
    };

    let threads = match parse_num("threads", 1) {
        0 => (num_cpus::get() - 1).max(1),
        n => n,
    };
    let config = Config {
        threads,
        timeout_ms: parse_num("timeout-ms", 1000) as u64,
        max_length: parse_num("max-length", 21),
        num_solutions: parse_num("num-solutions", 1),
        splits: parse_num("splits", 0),
    };

    let facelets = if let Some(s) = matches.opt_str("facelets") {
        s
    } else if let Some(maneuver) = matches.opt_str("scramble") {
        let scramble = match moves::parse_maneuver(&maneuver) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                exit(2);
            }
        };
        scramble_to_facelets(&scramble)
    } else if matches.opt_present("random") {
        let len = parse_num("random", 25);
        let seed = parse_num("seed", 42) as u64;
        let mut rng = SmallRng::seed_from_u64(seed);
        let scramble = moves::random_scramble(len, &mut rng);
        scramble_to_facelets(&scramble)
    } else {
        eprintln!("one of --facelets, --scramble or --random is required");
        eprintln!("{}", usage(&opts));
        exit(2);
    };

    info!("solving {facelets}");
    let solver = Solver::new(config);
    match solver.solve_report(&facelets) {
        Ok(report) => {
            if matches.opt_present("json") {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: failed to serialize report: {e}");
                        exit(1);
                    }
                }
            } else {
                println!("{}", report.best);
            }
            info!(
                "{} moves, {} nodes, {} ms",
                report.length, report.nodes, report.elapsed_ms
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            let code = match e {
                SolveError::Timeout { .. } => 3,
                SolveError::LengthExceeded { .. } => 4,
                _ => 2,
            };
            exit(code);
        }
    }
}

fn scramble_to_facelets(scramble: &[moves::Move]) -> String {
    info!("scramble: {}", moves::format_maneuver(scramble));
    let mut cube = CubieCube::SOLVED;
    cube.apply_all(scramble);
    facelet::render(&cube)
}
