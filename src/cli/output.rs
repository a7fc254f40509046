use std::io::{self, Write};

use automata::{Outcome, Pda, Policy, Report, Stack, Step, Verdict};
use serde::Serialize;

pub const RESET: &str = "\x1b[0;22m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";

pub fn write_report(
    out: &mut impl Write,
    pda: &Pda,
    report: &Report,
    quiet: bool,
    color: bool,
) -> io::Result<()> {
    writeln!(out, "running on: '{}'", report.input)?;

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let verdict = outcome.verdict();
        if color {
            let tint = match verdict {
                Verdict::Accepted => GREEN,
                Verdict::Rejected => RED,
                Verdict::StepLimitExceeded => YELLOW,
            };
            writeln!(out, "{BOLD}{tint}{verdict}{RESET} #{}", i + 1)?;
        } else {
            writeln!(out, "{verdict} #{}", i + 1)?;
        }

        if quiet {
            continue;
        }
        let path = outcome.path();
        for step in &path.steps {
            let transition = pda
                .transition(step.transition)
                .map(|t| pda.display_transition(t))
                .unwrap_or_default();
            writeln!(
                out,
                "  {}, pos {}, stack {}  {transition}",
                pda.state_name(step.state),
                step.position,
                pda.display_stack(&step.stack),
            )?;
        }
        writeln!(
            out,
            "  {}, pos {}, stack {}",
            pda.state_name(path.state),
            path.position,
            pda.display_stack(&path.stack),
        )?;
    }

    writeln!(
        out,
        "summary: {} accepted, {} rejected, {} step-limit exceeded",
        report.count(Verdict::Accepted),
        report.count(Verdict::Rejected),
        report.count(Verdict::StepLimitExceeded),
    )
}

/// Report with every identifier resolved to its declared name.
#[derive(Serialize)]
pub struct ReportView<'a> {
    input: &'a str,
    policy: Policy,
    steps: usize,
    accepted: usize,
    rejected: usize,
    step_limit_exceeded: usize,
    outcomes: Vec<OutcomeView<'a>>,
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    verdict: Verdict,
    steps: Vec<StepView<'a>>,
    state: &'a str,
    position: usize,
    /// Bottom first.
    stack: Vec<&'a str>,
}

#[derive(Serialize)]
struct StepView<'a> {
    state: &'a str,
    position: usize,
    stack: Vec<&'a str>,
    transition: usize,
    delta: String,
}

impl<'a> ReportView<'a> {
    pub fn new(pda: &'a Pda, report: &'a Report) -> Self {
        Self {
            input: &report.input,
            policy: report.policy,
            steps: report.steps,
            accepted: report.count(Verdict::Accepted),
            rejected: report.count(Verdict::Rejected),
            step_limit_exceeded: report.count(Verdict::StepLimitExceeded),
            outcomes: report
                .outcomes
                .iter()
                .map(|outcome| OutcomeView::new(pda, outcome))
                .collect(),
        }
    }
}

impl<'a> OutcomeView<'a> {
    fn new(pda: &'a Pda, outcome: &'a Outcome) -> Self {
        let path = outcome.path();
        Self {
            verdict: outcome.verdict(),
            steps: path.steps.iter().map(|step| StepView::new(pda, step)).collect(),
            state: pda.state_name(path.state),
            position: path.position,
            stack: names(pda, &path.stack),
        }
    }
}

impl<'a> StepView<'a> {
    fn new(pda: &'a Pda, step: &'a Step) -> Self {
        Self {
            state: pda.state_name(step.state),
            position: step.position,
            stack: names(pda, &step.stack),
            transition: step.transition,
            delta: pda
                .transition(step.transition)
                .map(|t| pda.display_transition(t))
                .unwrap_or_default(),
        }
    }
}

fn names<'a>(pda: &'a Pda, stack: &Stack) -> Vec<&'a str> {
    stack
        .as_slice()
        .iter()
        .map(|symbol| pda.symbol_name(*symbol))
        .collect()
}
