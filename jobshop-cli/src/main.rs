//! Command line front end for the job-shop solvers.
//!
//! ```text
//! jobshop-cli instances/ft10.txt --solver taboo --time-limit 30
//! jobshop-cli instances/la01.txt --solver greedy --rule est_lrpt --print-schedule
//! ```

use std::process;
use std::time::{Duration, Instant};

use clap::{Arg, ArgAction, Command};

use jobshop::instance::Instance;
use jobshop::solvers::descent::DescentSolver;
use jobshop::solvers::greedy::{GreedySolver, Priority};
use jobshop::solvers::random::RandomSolver;
use jobshop::solvers::taboo::TabooSolver;
use jobshop::solvers::{ExitCause, Solver};

fn main() {
    let matches = Command::new("jobshop")
        .about("Heuristic solvers for the job-shop scheduling problem")
        .arg(Arg::new("instance").required(true).help("Path to an instance file"))
        .arg(
            Arg::new("solver")
                .long("solver")
                .value_parser(["greedy", "descent", "taboo", "random"])
                .default_value("taboo")
                .help("Search strategy to run"),
        )
        .arg(
            Arg::new("rule")
                .long("rule")
                .default_value("est_spt")
                .help("Priority rule: spt, lpt, srpt, lrpt or an est_ variant"),
        )
        .arg(
            Arg::new("time-limit")
                .long("time-limit")
                .default_value("10")
                .help("Wall-clock budget in seconds"),
        )
        .arg(
            Arg::new("max-iterations")
                .long("max-iterations")
                .default_value("10000")
                .help("Iteration budget of the taboo solver"),
        )
        .arg(
            Arg::new("tenure")
                .long("tenure")
                .default_value("10")
                .help("Iterations a reversed move stays forbidden"),
        )
        .arg(
            Arg::new("print-schedule")
                .long("print-schedule")
                .action(ArgAction::SetTrue)
                .help("Print the per-machine schedule"),
        )
        .get_matches();

    let path = matches.get_one::<String>("instance").unwrap();
    let instance = Instance::read(path).unwrap_or_else(|err| {
        eprintln!("Cannot read instance '{}': {}", path, err);
        process::exit(1);
    });

    let rule: Priority = matches.get_one::<String>("rule").unwrap().parse().unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });
    let time_limit = parse_number::<u64>(&matches, "time-limit");
    let max_iterations = parse_number::<usize>(&matches, "max-iterations");
    let tenure = parse_number::<usize>(&matches, "tenure");

    let solver: Box<dyn Solver> = match matches.get_one::<String>("solver").unwrap().as_str() {
        "greedy" => Box::new(GreedySolver::new(rule)),
        "descent" => Box::new(DescentSolver::new(rule)),
        "taboo" => Box::new(TabooSolver::new(max_iterations, tenure).with_priority(rule)),
        "random" => Box::new(RandomSolver),
        _ => unreachable!(),
    };

    let started = Instant::now();
    let deadline = started + Duration::from_secs(time_limit);
    let result = solver.solve(&instance, deadline);
    let elapsed = started.elapsed();

    println!(
        "instance: {} ({} jobs x {} machines)",
        path,
        instance.num_jobs(),
        instance.num_machines()
    );
    println!("makespan: {}", result.schedule.makespan());
    if instance.optimal() > 0 {
        let gap = result.schedule.makespan().saturating_sub(instance.optimal());
        println!("best known: {} (gap {})", instance.optimal(), gap);
    }
    println!(
        "exit: {} after {:.3}s",
        match result.exit {
            ExitCause::Converged => "converged",
            ExitCause::Timeout => "timeout",
        },
        elapsed.as_secs_f64()
    );

    if matches.get_flag("print-schedule") {
        print!("{}", result.schedule.pretty_print(&instance));
    }
}

fn parse_number<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> T {
    let raw = matches.get_one::<String>(name).unwrap();
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Cannot parse --{} value '{}'", name, raw);
        process::exit(1);
    })
}
