//! Pushdown automata accepting by final state, loaded from JSON definitions
//! and explored with a bounded breadth first search.

pub mod automatan;
pub mod loader;

pub use automatan::{
    DEFAULT_STEP_BUDGET, Options, Policy, State, Symbol,
    pda::{Pda, Transition},
    simulate::{Outcome, Path, Report, SimulationError, Simulator, Step, Verdict, run, simulate},
    stack::Stack,
};
pub use loader::LoadError;
