use std::path::PathBuf;

use automata::DEFAULT_STEP_BUDGET;
use clap::Parser;

/// Runs a pushdown automaton over an input and reports every explored path.
#[derive(Debug, Parser)]
#[command(name = "pda-sim", version)]
pub struct Args {
    /// JSON automaton definition.
    pub file: PathBuf,

    /// Input string; prompted for on stdin when omitted.
    pub input: Option<String>,

    /// Maximum number of configurations to process.
    #[arg(short, long, default_value_t = DEFAULT_STEP_BUDGET)]
    pub steps: usize,

    /// Only ever follow the first applicable transition.
    #[arg(long)]
    pub greedy: bool,

    /// Print the report as JSON.
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Only print verdicts and the summary.
    #[arg(short, long)]
    pub quiet: bool,
}
