//! Train every CFR variant on Kuhn Poker and compare them.
//!
//! Usage:
//!   cargo run --release --bin kuhn -- [OPTIONS]
//!
//! Options:
//!   --iterations <N>     Max iterations per variant (default: 10000)
//!   --patience <N>       Quiet iterations before stopping early (default: 100)
//!   --tolerance <X>      Strategy change counted as quiet (default: 1e-5)
//!   --sample             Sample one deal per pass instead of all six
//!   --seed <N>           Random seed for sampled deals
//!   --progress           Show a progress bar per variant
//!   --json               Print each training report as JSON
//!   --verbose            Log periodic progress lines (debug level)

use std::env;
use std::process;

use cfr_solver::cfr::{CFRConfig, CFRSolver, CfrVariant, TrainingReport};
use cfr_solver::games::kuhn::KuhnPoker;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut iterations: u64 = 10_000;
    let mut patience: u64 = 100;
    let mut tolerance: f64 = 1e-5;
    let mut sample = false;
    let mut seed: Option<u64> = None;
    let mut progress = false;
    let mut json = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--iterations" | "-i" => {
                i += 1;
                iterations = parse_value(&args, i, iterations);
            }
            "--patience" | "-p" => {
                i += 1;
                patience = parse_value(&args, i, patience);
            }
            "--tolerance" | "-t" => {
                i += 1;
                tolerance = parse_value(&args, i, tolerance);
            }
            "--seed" | "-s" => {
                i += 1;
                seed = args.get(i).and_then(|s| s.parse().ok());
            }
            "--sample" => sample = true,
            "--progress" => progress = true,
            "--json" => json = true,
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                process::exit(2);
            }
        }
        i += 1;
    }

    init_logging(if verbose { LevelFilter::Debug } else { LevelFilter::Info });

    let variants = [
        CfrVariant::Vanilla,
        CfrVariant::CfrPlus,
        CfrVariant::Linear,
        CfrVariant::Discounted,
    ];
    let mut results: Vec<(CfrVariant, TrainingReport)> = Vec::new();

    for variant in variants {
        let mut config = CFRConfig::from_variant(variant)
            .with_chance_sampling(sample)
            .with_progress(progress);
        if let Some(s) = seed {
            config = config.with_seed(s);
        }

        println!("=================================================");
        println!("  Training {}", variant);
        println!("=================================================");

        let mut solver = CFRSolver::new(KuhnPoker::new(), config);
        let report = match solver.train(iterations, patience, tolerance) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };

        for key in solver.info_set_keys() {
            let names = solver.get_action_names(&key).unwrap_or_default();
            let strategy = &report.average_strategy[&key];
            let line: Vec<String> = names
                .iter()
                .zip(strategy)
                .map(|(name, p)| format!("{} {:.3}", name, p))
                .collect();
            println!("  {:<6} {}", key, line.join(", "));
        }
        println!();

        if json {
            match report.to_json() {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("Error serializing report: {}", e),
            }
        }

        results.push((variant, report));
    }

    println!("=================================================");
    println!("  Summary");
    println!("=================================================");
    for (variant, report) in &results {
        println!(
            "{:<5} iterations {:>7}{}  exploitability {:.6}  time {:.2}s",
            variant.to_string(),
            report.iterations,
            if report.stopped_early { " (early)" } else { "        " },
            report.final_exploitability().unwrap_or(f64::NAN),
            report.elapsed_seconds
        );
        for card in ["J", "Q", "K"] {
            let key = format!("{}:", card);
            match report.average_strategy.get(&key) {
                Some(strategy) => {
                    println!("    {}: Bet {:.2}, Pass {:.2}", card, strategy[1], strategy[0])
                }
                None => println!("    {}: (no data)", card),
            }
        }
    }
}

/// Route the solver's `log` lines to the terminal.
fn init_logging(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Logger unavailable: {}", e);
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, default: T) -> T {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn print_help() {
    println!("Kuhn Poker CFR variant comparison");
    println!();
    println!("Usage: kuhn [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -i, --iterations <N>   Max iterations per variant (default: 10000)");
    println!("  -p, --patience <N>     Quiet iterations before stopping early (default: 100)");
    println!("  -t, --tolerance <X>    Strategy change counted as quiet (default: 1e-5)");
    println!("      --sample           Sample one deal per pass");
    println!("  -s, --seed <N>         Random seed for sampled deals");
    println!("      --progress         Show a progress bar per variant");
    println!("      --json             Print each training report as JSON");
    println!("  -v, --verbose          Log periodic progress lines");
    println!("  -h, --help             Show this help");
}
