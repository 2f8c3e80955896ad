use std::env;
use std::process;
use std::time::Duration;

use clap::{App, Arg, ArgGroup, ArgMatches};
use log::debug;
use prettytable::{Cell, Row, Table};

use sokoban_anytime::config::{Config, Format, HeuristicKind, Method};
use sokoban_anytime::fs::load_level_format;
use sokoban_anytime::solver::{heuristic_fn, weight_sweep};
use sokoban_anytime::state::{sokoban_goal_state, SokobanState};
use sokoban_anytime::Solve;

fn main() {
    env_logger::init();

    let matches = App::new("sokoban-anytime")
        .author("martin-t")
        .version("0.1")
        .about("Anytime weighted A* and GBFS for Sokoban with any number of robots")
        .arg(
            Arg::with_name("method")
                .short("m")
                .long("method")
                .takes_value(true)
                .possible_values(&["weighted", "iterative-astar", "iterative-gbfs"])
                .help("search method (default iterative-gbfs)"),
        )
        .arg(
            Arg::with_name("heuristic")
                .short("e")
                .long("heuristic")
                .takes_value(true)
                .possible_values(&["manhattan", "alternate", "zero"])
                .help("heuristic (default alternate)"),
        )
        .arg(
            Arg::with_name("weight")
                .short("w")
                .long("weight")
                .takes_value(true)
                .help("weight for the weighted method (default 10)"),
        )
        .arg(
            Arg::with_name("weights")
                .long("weights")
                .takes_value(true)
                .use_delimiter(true)
                .conflicts_with_all(&["method", "weight"])
                .help("run weighted A* once per weight instead, e.g. 10,5,2,1"),
        )
        .arg(
            Arg::with_name("timebound")
                .short("t")
                .long("timebound")
                .takes_value(true)
                .help("seconds per problem (per run with --weights, default 2)"),
        )
        .arg(
            Arg::with_name("custom")
                .short("c")
                .long("custom")
                .help("parse as custom format"),
        )
        .arg(
            Arg::with_name("xsb")
                .short("x")
                .long("xsb")
                .help("parse as XSB format (default)"),
        )
        .group(ArgGroup::with_name("format").arg("custom").arg("xsb"))
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("don't print the solution path"),
        )
        .arg(Arg::with_name("file").required(true).multiple(true))
        .get_matches();

    let config = build_config(&matches).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });
    debug!("{:?}", config);

    // required so always present
    let paths: Vec<_> = matches.values_of("file").unwrap().collect();

    match matches.values_of("weights") {
        Some(weights) => {
            let weights = parse_weights(weights).unwrap_or_else(|err| {
                eprintln!("{}", err);
                process::exit(1);
            });
            run_sweep(&paths, &config, &weights);
        }
        None => run_anytime(&paths, &config),
    }
}

fn load(path: &str, format: Format) -> SokobanState {
    load_level_format(path, format).unwrap_or_else(|err| {
        let current_dir = env::current_dir().unwrap();
        eprintln!(
            "Can't load level {} in {}: {}",
            path,
            current_dir.display(),
            err
        );
        process::exit(1);
    })
}

fn run_anytime(paths: &[&str], config: &Config) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Problem"),
        Cell::new("Solved"),
        Cell::new("Cost"),
        Cell::new("Expanded"),
    ]));
    let mut unsolved = Vec::new();

    for &path in paths {
        let state = load(path, config.format);

        println!("Solving {}...", path);
        let solver_ok = state.solve(config).unwrap_or_else(|err| {
            eprintln!("Failed to solve {}: {}", path, err);
            process::exit(1);
        });

        let expanded = solver_ok.stats.total_expanded().to_string();
        match solver_ok.solution {
            Some(ref solution) => {
                if config.print_path {
                    for s in &solution.path {
                        println!("{}", s.format(config.format));
                    }
                }
                println!("Cost: {}", solution.cost);
                table.add_row(Row::new(vec![
                    Cell::new(path),
                    Cell::new("yes"),
                    Cell::new(&solution.cost.to_string()),
                    Cell::new(&expanded),
                ]));
            }
            None => {
                println!("No solution");
                unsolved.push(path);
                table.add_row(Row::new(vec![
                    Cell::new(path),
                    Cell::new("no"),
                    Cell::new("-"),
                    Cell::new(&expanded),
                ]));
            }
        }
        println!("{}", solver_ok.stats);
    }

    table.printstd();
    println!(
        "Of {} initial problems, {} were solved in less than {} seconds by this solver.",
        paths.len(),
        paths.len() - unsolved.len(),
        config.time_budget.as_secs_f64()
    );
    println!(
        "Problems that remain unsolved in the set are Problems: {:?}",
        unsolved
    );
}

fn run_sweep(paths: &[&str], config: &Config, weights: &[f64]) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Problem"),
        Cell::new("Weight"),
        Cell::new("Cost"),
        Cell::new("Expanded"),
    ]));
    let mut solved = 0;
    let mut consistent = 0;

    for &path in paths {
        let state = load(path, config.format);

        println!("Solving {}...", path);
        let sweep = weight_sweep(
            &state,
            sokoban_goal_state,
            heuristic_fn(config.heuristic),
            weights,
            config.time_budget,
        )
        .unwrap_or_else(|err| {
            eprintln!("Failed to solve {}: {}", path, err);
            process::exit(1);
        });

        for run in &sweep.runs {
            let cost = match run.cost {
                Some(cost) => {
                    println!("Weight {}: cost {}, expanded {}", run.weight, cost, run.expanded);
                    cost.to_string()
                }
                None => {
                    println!("Weight {}: no solution, expanded {}", run.weight, run.expanded);
                    "-".to_string()
                }
            };
            table.add_row(Row::new(vec![
                Cell::new(path),
                Cell::new(&run.weight.to_string()),
                Cell::new(&cost),
                Cell::new(&run.expanded.to_string()),
            ]));
        }

        solved += sweep.solved();
        if sweep.expands_more_as_weight_decreases() {
            consistent += 1;
        }
    }

    table.printstd();
    println!(
        "Of the {} runs over {} problems, {} solutions were found with weighted a star in the time allotted.",
        paths.len() * weights.len(),
        paths.len(),
        solved
    );
    println!(
        "Weighted a-star expanded more nodes as weights decreased {} of {} times",
        consistent,
        paths.len()
    );
}

fn parse_weights<'a, I: Iterator<Item = &'a str>>(weights: I) -> Result<Vec<f64>, String> {
    weights
        .map(|weight| {
            let parsed: f64 = weight
                .parse()
                .map_err(|_| format!("Invalid weight: {}", weight))?;
            if parsed < 1.0 {
                return Err(format!("Weight must be at least 1, got {}", weight));
            }
            Ok(parsed)
        })
        .collect()
}

fn build_config(matches: &ArgMatches<'_>) -> Result<Config, String> {
    let mut config = Config::default();

    if let Some(method) = matches.value_of("method") {
        config.method = method.parse::<Method>()?;
    }
    if let Some(heuristic) = matches.value_of("heuristic") {
        config.heuristic = heuristic.parse::<HeuristicKind>()?;
    }
    if let Some(weight) = matches.value_of("weight") {
        config.weight = parse_weights(std::iter::once(weight))?[0];
    }
    if let Some(secs) = matches.value_of("timebound") {
        let secs: f64 = secs
            .parse()
            .map_err(|_| format!("Invalid timebound: {}", secs))?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(format!("Invalid timebound: {}", secs));
        }
        config.time_budget = Duration::from_secs_f64(secs);
    }
    if matches.is_present("custom") {
        config.format = Format::Custom;
    }
    config.print_path = !matches.is_present("quiet");

    Ok(config)
}
