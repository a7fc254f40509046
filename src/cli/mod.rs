use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use automata::{
    LoadError, Options, Policy, SimulationError, Simulator,
    loader::{self, Context},
};

pub mod args;
pub mod output;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exit status for definitions that fail to load.
const INVALID_DEFINITION: u8 = 2;

pub fn run(args: args::Args) -> Result<ExitCode, CliError> {
    let src = loader::read_source(&args.file)?;
    let mut ctx = Context::new(&src);
    let pda = loader::parse(&mut ctx);
    for log in ctx.logs_display() {
        eprint!("{log}");
    }
    let Some(pda) = pda else {
        return Ok(ExitCode::from(INVALID_DEFINITION));
    };

    let input = match args.input {
        Some(input) => input,
        None => prompt()?,
    };

    let options = Options {
        step_budget: args.steps,
        policy: if args.greedy {
            Policy::Greedy
        } else {
            Policy::Exhaustive
        },
    };
    let report = Simulator::begin(&pda, &input, options).finish()?;

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &output::ReportView::new(&pda, &report))?;
        writeln!(stdout)?;
    } else {
        let color = stdout.is_terminal();
        output::write_report(&mut stdout, &pda, &report, args.quiet, color)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn prompt() -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "input: ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(len);
    Ok(line)
}
