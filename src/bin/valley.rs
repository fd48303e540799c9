use std::io;
use std::process::ExitCode;

use log::trace;

use blizzard_basin::{solve, Error, Grid, SearchConfig, Strategy, Valley};

const USAGE: &str = "usage: valley part1|part2 [settled|best-first|heuristic|weighted|endgame]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match run(&args) {
        Ok(total) => {
            println!("{}", total);
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(args: &[&str]) -> Result<usize, Error> {
    let (legs, strategy) = match args[..] {
        ["part1"] => (1, Strategy::default()),
        ["part2"] => (3, Strategy::default()),
        ["part1", s] => (1, s.parse()?),
        ["part2", s] => (3, s.parse()?),
        _ => return Err(Error::Usage(USAGE.to_string())),
    };

    let input = io::read_to_string(io::stdin())?;
    let grid: Grid = input.parse()?;
    trace!("valley at minute 0:\n{}", grid.render(0));

    let config = SearchConfig::with_strategy(strategy);
    let valley = Valley::new(grid, config.max_states)?;
    let journey = solve(&valley, &config, legs)?;
    trace!("valley on arrival:\n{}", valley.grid().render(journey.total()));
    Ok(journey.total())
}
