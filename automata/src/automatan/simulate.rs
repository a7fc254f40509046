use std::collections::{HashSet, VecDeque};
use std::fmt::Display;

use im::Vector;
use tracing::{debug, trace, warn};

use super::pda::Pda;
use super::stack::Stack;
use super::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("transition applied to a mismatched stack top: expected {expected:?}, found {found:?}")]
    InternalInvariant {
        expected: Symbol,
        found: Option<Symbol>,
    },
}

/// The configuration a transition was taken from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub state: State,
    pub position: usize,
    pub stack: Stack,
    /// Index into [`Pda::transitions`].
    pub transition: usize,
}

/// Every step of one branch, plus the configuration it ended in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub steps: Vector<Step>,
    pub state: State,
    pub position: usize,
    pub stack: Stack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
    StepLimitExceeded,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Verdict::Accepted => "ACCEPTED",
            Verdict::Rejected => "REJECTED",
            Verdict::StepLimitExceeded => "STEP LIMIT EXCEEDED",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Path),
    Rejected(Path),
    StepLimitExceeded(Path),
}

impl Outcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            Outcome::Accepted(_) => Verdict::Accepted,
            Outcome::Rejected(_) => Verdict::Rejected,
            Outcome::StepLimitExceeded(_) => Verdict::StepLimitExceeded,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Outcome::Accepted(path) | Outcome::Rejected(path) | Outcome::StepLimitExceeded(path) => {
                path
            }
        }
    }
}

/// One branch of the search. Never mutated once created.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub state: State,
    pub position: usize,
    pub stack: Stack,
    pub path: Vector<Step>,
}

impl Configuration {
    fn key(&self) -> (State, usize, Stack) {
        (self.state, self.position, self.stack.clone())
    }

    fn into_path(self) -> Path {
        Path {
            steps: self.path,
            state: self.state,
            position: self.position,
            stack: self.stack,
        }
    }
}

/// Acceptance by final state: the whole input is read and the state is
/// final. The stack is irrelevant.
pub fn evaluate(pda: &Pda, input_len: usize, config: Configuration) -> Outcome {
    if config.position == input_len && pda.is_final(config.state) {
        Outcome::Accepted(config.into_path())
    } else {
        Outcome::Rejected(config.into_path())
    }
}

#[derive(Clone, Debug)]
pub struct Report {
    pub input: String,
    pub policy: Policy,
    /// Configurations processed.
    pub steps: usize,
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn count(&self, verdict: Verdict) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.verdict() == verdict)
            .count()
    }

    pub fn accepted(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Accepted(path) => Some(path),
            _ => None,
        })
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted().next().is_some()
    }

    pub fn exhausted(&self) -> bool {
        self.count(Verdict::StepLimitExceeded) != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Pending,
    Finished,
}

/// Explores the configurations of `pda` on one input.
///
/// The exhaustive policy runs a breadth first search over a FIFO worklist.
/// The greedy policy only ever enqueues the first applicable transition, so
/// the worklist holds at most one configuration. Under both policies a
/// configuration whose `(state, position, stack)` was already processed is
/// dropped, and once `step_budget` configurations were processed every
/// remaining one is finalized as [`Outcome::StepLimitExceeded`].
pub struct Simulator<'p> {
    pda: &'p Pda,
    input: Vec<char>,
    options: Options,
    pending: VecDeque<Configuration>,
    visited: HashSet<(State, usize, Stack)>,
    outcomes: Vec<Outcome>,
    steps: usize,
    exhausted: bool,
}

impl<'p> Simulator<'p> {
    pub fn begin(pda: &'p Pda, input: &str, options: Options) -> Self {
        debug!(
            input,
            policy = ?options.policy,
            step_budget = options.step_budget,
            "simulation started"
        );
        Self {
            pda,
            input: input.chars().collect(),
            options,
            pending: VecDeque::from([Configuration {
                state: pda.initial_state(),
                position: 0,
                stack: Stack::new(),
                path: Vector::new(),
            }]),
            visited: HashSet::new(),
            outcomes: Vec::new(),
            steps: 0,
            exhausted: false,
        }
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Takes one configuration off the worklist and processes it.
    pub fn step(&mut self) -> Result<Progress, SimulationError> {
        let Some(config) = self.pending.pop_front() else {
            return Ok(Progress::Finished);
        };

        if !self.visited.insert(config.key()) {
            return Ok(self.progress());
        }

        if self.steps >= self.options.step_budget {
            if !self.exhausted {
                self.exhausted = true;
                warn!(
                    steps = self.steps,
                    pending = self.pending.len() + 1,
                    "step budget exhausted"
                );
            }
            self.outcomes.push(Outcome::StepLimitExceeded(config.into_path()));
            return Ok(self.progress());
        }
        self.steps += 1;

        let pda = self.pda;
        let lookahead = self.input.get(config.position).copied();
        let top = config.stack.top();
        trace!(
            state = pda.state_name(config.state),
            position = config.position,
            stack = %pda.display_stack(&config.stack),
            "expanding"
        );

        let matching = pda.matching(config.state, lookahead, top);
        let successors: Vec<_> = match self.options.policy {
            Policy::Exhaustive => matching.collect(),
            Policy::Greedy => matching.take(1).collect(),
        };

        if successors.is_empty() {
            let outcome = evaluate(pda, self.input.len(), config);
            self.outcomes.push(outcome);
            return Ok(self.progress());
        }

        for (index, transition) in successors {
            let stack = transition.apply(&config.stack)?;
            let mut path = config.path.clone();
            path.push_back(Step {
                state: config.state,
                position: config.position,
                stack: config.stack.clone(),
                transition: index,
            });
            self.pending.push_back(Configuration {
                state: transition.to,
                position: config.position + usize::from(transition.reads()),
                stack,
                path,
            });
        }
        Ok(self.progress())
    }

    fn progress(&self) -> Progress {
        if self.pending.is_empty() {
            Progress::Finished
        } else {
            Progress::Pending
        }
    }

    /// Runs the search to completion.
    pub fn finish(mut self) -> Result<Report, SimulationError> {
        while self.step()? == Progress::Pending {}

        let report = Report {
            input: self.input.iter().collect(),
            policy: self.options.policy,
            steps: self.steps,
            outcomes: self.outcomes,
        };
        debug!(
            steps = report.steps,
            accepted = report.count(Verdict::Accepted),
            rejected = report.count(Verdict::Rejected),
            limited = report.count(Verdict::StepLimitExceeded),
            "simulation finished"
        );
        Ok(report)
    }
}

/// Exhaustively explores `input`, processing at most `step_budget`
/// configurations.
pub fn simulate(pda: &Pda, input: &str, step_budget: usize) -> Result<Report, SimulationError> {
    run(pda, input, Options::exhaustive(step_budget))
}

pub fn run(pda: &Pda, input: &str, options: Options) -> Result<Report, SimulationError> {
    Simulator::begin(pda, input, options).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automatan::pda::tests::{ANBN, load};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn verdicts(report: &Report) -> Vec<Verdict> {
        report.outcomes.iter().map(Outcome::verdict).collect()
    }

    fn automaton(finals: &[&str], transitions: serde_json::Value) -> Pda {
        load(
            &json!({
                "estados": ["q0", "q1", "q2"],
                "alfabeto_entrada": ["a", "b"],
                "alfabeto_pilha": ["Z", "A"],
                "estado_inicial": "q0",
                "estados_finais": finals,
                "transicoes": transitions,
            })
            .to_string(),
        )
    }

    fn t(from: &str, read: &str, top: &str, push: &str, to: &str) -> serde_json::Value {
        json!({
            "estado_origem": from,
            "leitura": read,
            "topo_pilha": top,
            "substituir_topo": push,
            "estado_destino": to,
        })
    }

    #[test]
    fn anbn_accepts_balanced_input() {
        let pda = load(ANBN);
        let report = simulate(&pda, "aabb", 1_000).unwrap();

        let accepted: Vec<_> = report.accepted().collect();
        assert_eq!(accepted.len(), 1);
        let path = accepted[0];
        assert_eq!(pda.state_name(path.state), "q1");
        assert!(path.stack.is_empty());
        assert_eq!(path.position, 4);
        assert_eq!(
            path.steps.iter().map(|s| s.transition).collect::<Vec<_>>(),
            vec![0, 0, 1, 2]
        );
        assert!(!report.exhausted());
    }

    #[test]
    fn anbn_rejects_unbalanced_input() {
        let pda = load(ANBN);
        for input in ["aab", "abb", "", "ba", "aba"] {
            let report = simulate(&pda, input, 1_000).unwrap();
            assert!(!report.outcomes.is_empty(), "{input:?}");
            assert!(
                report
                    .outcomes
                    .iter()
                    .all(|o| o.verdict() == Verdict::Rejected),
                "{input:?}"
            );
        }
    }

    #[test]
    fn path_records_configuration_before_each_move() {
        let pda = load(ANBN);
        let report = simulate(&pda, "ab", 1_000).unwrap();
        let path = report.accepted().next().unwrap();
        let z = pda.symbol("Z").unwrap();

        let first = &path.steps[0];
        assert_eq!(first.state, pda.initial_state());
        assert_eq!(first.position, 0);
        assert!(first.stack.is_empty());

        let second = &path.steps[1];
        assert_eq!(second.position, 1);
        assert_eq!(second.stack, Stack::from_bottom([z]));
    }

    #[test]
    fn epsilon_push_loop_hits_step_limit() {
        let pda = automaton(&["q1"], json!([t("q0", "", "", "Z", "q0")]));
        let report = simulate(&pda, "", 10).unwrap();

        assert_eq!(verdicts(&report), vec![Verdict::StepLimitExceeded]);
        assert_eq!(report.steps, 10);
        assert_eq!(report.outcomes[0].path().steps.len(), 10);
    }

    #[test]
    fn exact_cycles_are_not_expanded_twice() {
        let pda = automaton(
            &["q1"],
            json!([
                t("q0", "", "", "", "q1"),
                t("q1", "", "", "", "q0"),
                t("q0", "a", "", "", "q2"),
            ]),
        );
        let report = simulate(&pda, "", 100).unwrap();
        // q0 -> q1 -> q0 again: the repeat is dropped, nothing terminal is left
        assert!(report.outcomes.is_empty());
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn empty_input_with_accepting_start() {
        let pda = automaton(&["q0"], json!([]));
        let report = simulate(&pda, "", 10).unwrap();

        assert_eq!(verdicts(&report), vec![Verdict::Accepted]);
        let path = report.outcomes[0].path();
        assert!(path.steps.is_empty());
        assert_eq!(path.state, pda.initial_state());
    }

    #[test]
    fn zero_budget_finalizes_the_seed() {
        let pda = automaton(&["q0"], json!([]));
        let report = simulate(&pda, "", 0).unwrap();
        assert_eq!(verdicts(&report), vec![Verdict::StepLimitExceeded]);
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn acceptance_needs_consumed_input_and_final_state() {
        // consumed input, final state
        let pda = automaton(&["q1"], json!([t("q0", "a", "", "", "q1")]));
        assert_eq!(verdicts(&simulate(&pda, "a", 10).unwrap()), vec![Verdict::Accepted]);
        // input left over
        assert_eq!(verdicts(&simulate(&pda, "ab", 10).unwrap()), vec![Verdict::Rejected]);
        // not final
        let pda = automaton(&["q2"], json!([t("q0", "a", "", "", "q1")]));
        assert_eq!(verdicts(&simulate(&pda, "a", 10).unwrap()), vec![Verdict::Rejected]);
    }

    #[test]
    fn stack_contents_do_not_matter() {
        let pda = automaton(&["q1"], json!([t("q0", "a", "", "A Z", "q1")]));
        let report = simulate(&pda, "a", 10).unwrap();
        assert!(report.is_accepted());
        assert_eq!(report.accepted().next().unwrap().stack.len(), 2);
    }

    #[test]
    fn unknown_input_symbols_reject() {
        let pda = load(ANBN);
        let report = simulate(&pda, "axb", 100).unwrap();
        assert!(!report.outcomes.is_empty());
        assert!(!report.is_accepted());
    }

    #[test]
    fn branches_are_reported_in_declaration_order() {
        let pda = automaton(
            &["q1", "q2"],
            json!([
                t("q0", "a", "", "", "q2"),
                t("q0", "a", "", "", "q1"),
                t("q0", "", "", "", "q1"),
            ]),
        );
        let report = simulate(&pda, "a", 100).unwrap();
        let ends: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| (o.verdict(), pda.state_name(o.path().state)))
            .collect();
        assert_eq!(
            ends,
            vec![
                (Verdict::Accepted, "q2"),
                (Verdict::Accepted, "q1"),
                (Verdict::Rejected, "q1"),
            ]
        );
    }

    #[test]
    fn greedy_follows_first_transition_only() {
        let pda = automaton(
            &["q1"],
            json!([
                t("q0", "a", "", "", "q2"),
                t("q0", "a", "", "", "q1"),
            ]),
        );
        let greedy = run(&pda, "a", Options::greedy(100)).unwrap();
        assert_eq!(verdicts(&greedy), vec![Verdict::Rejected]);
        assert_eq!(greedy.policy, Policy::Greedy);

        let exhaustive = simulate(&pda, "a", 100).unwrap();
        assert!(exhaustive.is_accepted());
    }

    #[test]
    fn greedy_runs_into_safety_bound() {
        let pda = automaton(&["q1"], json!([t("q0", "", "", "Z", "q0")]));
        let report = run(&pda, "", Options::greedy(25)).unwrap();
        assert_eq!(verdicts(&report), vec![Verdict::StepLimitExceeded]);
        assert_eq!(report.outcomes[0].path().steps.len(), 25);
    }

    #[test]
    fn exact_cycles_collapse_under_both_policies() {
        let pda = automaton(&["q1"], json!([t("q0", "", "", "", "q0")]));
        let exhaustive = simulate(&pda, "", 10).unwrap();
        let greedy = run(&pda, "", Options::greedy(10)).unwrap();

        assert!(exhaustive.outcomes.is_empty());
        assert_eq!(exhaustive.outcomes, greedy.outcomes);
        assert_eq!(exhaustive.steps, 1);
        assert_eq!(greedy.steps, 1);
    }

    #[test]
    fn budget_finalizes_every_pending_branch_once() {
        let pda = automaton(
            &["q0"],
            json!([
                t("q0", "", "", "Z", "q1"),
                t("q0", "", "", "Z", "q2"),
                t("q1", "", "", "Z", "q1"),
                t("q1", "", "", "A", "q1"),
                t("q2", "", "", "Z", "q1"),
            ]),
        );
        let report = simulate(&pda, "", 3).unwrap();
        let z = pda.symbol("Z").unwrap();
        let a = pda.symbol("A").unwrap();
        let q1 = pda.state("q1").unwrap();

        // q1 [Z Z] is reached twice; the second copy is dropped, not finalized
        assert_eq!(
            verdicts(&report),
            vec![Verdict::StepLimitExceeded, Verdict::StepLimitExceeded]
        );
        let ends: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| (o.path().state, o.path().stack.clone()))
            .collect();
        assert_eq!(
            ends,
            vec![
                (q1, Stack::from_bottom([z, z])),
                (q1, Stack::from_bottom([z, a])),
            ]
        );
        assert_eq!(report.steps, 3);
    }

    #[test]
    fn stepping_is_incremental() {
        let pda = load(ANBN);
        let mut simulator = Simulator::begin(&pda, "ab", Options::default());
        assert_eq!(simulator.pending(), 1);
        assert_eq!(simulator.step().unwrap(), Progress::Pending);
        assert_eq!(simulator.steps(), 1);
        assert!(simulator.outcomes().is_empty());

        while simulator.step().unwrap() == Progress::Pending {}
        assert_eq!(simulator.step().unwrap(), Progress::Finished);
        assert_eq!(simulator.outcomes().len(), 1);
    }

    #[test]
    fn accepts_shortcut() {
        let pda = load(ANBN);
        assert!(pda.accepts("aaabbb", 1_000).unwrap());
        assert!(!pda.accepts("aaabb", 1_000).unwrap());
    }

    fn arb_definition(epsilon: bool) -> impl Strategy<Value = String> {
        let letters: &'static [&'static str] = if epsilon { &["a", "b", ""] } else { &["a", "b"] };
        let transition = (
            prop::sample::select(vec!["q0", "q1"]),
            prop::sample::select(letters),
            prop::sample::select(vec!["", "Z", "A"]),
            prop::sample::select(vec!["", "Z", "A", "A Z", "Z Z"]),
            prop::sample::select(vec!["q0", "q1"]),
        )
            .prop_map(|(from, read, top, push, to)| t(from, read, top, push, to));
        (
            prop::collection::vec(transition, 0..5),
            prop::sample::select(vec!["q0", "q1"]),
        )
            .prop_map(|(transitions, finals)| {
                json!({
                    "estados": ["q0", "q1"],
                    "alfabeto_entrada": ["a", "b"],
                    "alfabeto_pilha": ["Z", "A"],
                    "estado_inicial": "q0",
                    "estados_finais": [finals],
                    "transicoes": transitions,
                })
                .to_string()
            })
    }

    fn arb_input() -> impl Strategy<Value = String> {
        "[ab]{0,5}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn reading_only_automata_terminate(src in arb_definition(false), input in arb_input()) {
            let pda = load(&src);
            let report = simulate(&pda, &input, 1_000_000).unwrap();
            prop_assert!(!report.exhausted());
            prop_assert!(!report.outcomes.is_empty());
            for outcome in &report.outcomes {
                prop_assert_eq!(outcome.path().steps.len(), outcome.path().position);
            }
        }

        #[test]
        fn simulation_is_repeatable(src in arb_definition(true), input in arb_input()) {
            let pda = load(&src);
            let first = simulate(&pda, &input, 200).unwrap();
            let second = simulate(&pda, &input, 200).unwrap();
            prop_assert_eq!(first.outcomes, second.outcomes);
            prop_assert_eq!(first.steps, second.steps);
        }

        #[test]
        fn policies_agree_without_choices(src in arb_definition(true), input in arb_input()) {
            let pda = load(&src);
            let budget = 50;

            // follow the only possible run by hand, giving up on any choice
            let mut deterministic = true;
            let mut state = pda.initial_state();
            let mut position = 0;
            let mut stack = Stack::new();
            let chars: Vec<char> = input.chars().collect();
            let mut seen = HashSet::new();
            for _ in 0..=budget {
                if !seen.insert((state, position, stack.clone())) {
                    break;
                }
                let moves: Vec<_> = pda.matching(state, chars.get(position).copied(), stack.top()).collect();
                match moves.as_slice() {
                    [] => break,
                    [(_, t)] => {
                        stack = t.apply(&stack).unwrap();
                        position += usize::from(t.reads());
                        state = t.to;
                    }
                    _ => {
                        deterministic = false;
                        break;
                    }
                }
            }
            prop_assume!(deterministic);

            let exhaustive = run(&pda, &input, Options::exhaustive(budget)).unwrap();
            let greedy = run(&pda, &input, Options::greedy(budget)).unwrap();
            prop_assert_eq!(exhaustive.outcomes, greedy.outcomes);
        }
    }
}
