use std::collections::{HashMap, HashSet, hash_map::Entry};

use super::*;
use super::simulate::{SimulationError, simulate};
use super::stack::Stack;

use crate::loader::{
    self, Context, DELTA_LOWER, EPSILON_LOWER, Field, LoadError,
    ast::{self, Document},
    log::{LogSink, Logs},
};

/// One move of the automaton.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Transition {
    pub from: State,
    /// `None` consumes no input.
    pub letter: Option<char>,
    /// `None` neither inspects nor pops the stack.
    pub top: Option<Symbol>,
    /// Pushed so that `push[0]` becomes the new top.
    pub push: Vec<Symbol>,
    pub to: State,
}

impl Transition {
    pub fn reads(&self) -> bool {
        self.letter.is_some()
    }

    pub fn is_epsilon(&self) -> bool {
        self.letter.is_none()
    }

    pub fn applies(&self, state: State, lookahead: Option<char>, top: Option<Symbol>) -> bool {
        self.from == state
            && (self.letter.is_none() || self.letter == lookahead)
            && (self.top.is_none() || self.top == top)
    }
}

/// Transitions of `transitions` applicable at `(state, lookahead, top)`,
/// with their indices, in declaration order.
///
/// `None` stands for epsilon: the end of the input or an empty stack.
pub fn matching(
    transitions: &[Transition],
    state: State,
    lookahead: Option<char>,
    top: Option<Symbol>,
) -> impl Iterator<Item = (usize, &Transition)> {
    transitions
        .iter()
        .enumerate()
        .filter(move |(_, t)| t.applies(state, lookahead, top))
}

/// An immutable, validated pushdown automaton accepting by final state.
#[derive(Clone, Debug)]
pub struct Pda {
    initial_state: State,
    state_names: StateMap<String>,
    symbol_names: SymbolMap<String>,
    final_states: StateMap<bool>,
    transitions: Vec<Transition>,
    /// Per source state, indices into `transitions` in declaration order.
    outgoing: StateMap<Vec<usize>>,
}

impl Pda {
    pub fn initial_state(&self) -> State {
        self.initial_state
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(index)
    }

    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.state_names.entries().map(|(state, _)| state)
    }

    pub fn is_final(&self, state: State) -> bool {
        self.final_states.get(state).copied().unwrap_or_default()
    }

    pub fn state(&self, name: &str) -> Option<State> {
        self.state_names
            .entries()
            .find_map(|(state, n)| (n == name).then_some(state))
    }

    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.symbol_names
            .entries()
            .find_map(|(symbol, n)| (n == name).then_some(symbol))
    }

    pub fn state_name(&self, state: State) -> &str {
        self.state_names.get(state).map(String::as_str).unwrap_or("?")
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        self.symbol_names.get(symbol).map(String::as_str).unwrap_or("?")
    }

    /// Same as [`matching`], using the per-state index.
    pub fn matching(
        &self,
        state: State,
        lookahead: Option<char>,
        top: Option<Symbol>,
    ) -> impl Iterator<Item = (usize, &Transition)> {
        self.outgoing
            .get(state)
            .into_iter()
            .flatten()
            .map(|&index| (index, &self.transitions[index]))
            .filter(move |(_, t)| t.applies(state, lookahead, top))
    }

    /// Whether any exhaustively explored path accepts `input`.
    pub fn accepts(&self, input: &str, step_budget: usize) -> Result<bool, SimulationError> {
        Ok(simulate(self, input, step_budget)?.is_accepted())
    }

    /// Stack rendered bottom first, e.g. `[Z, A]` has `A` on top.
    pub fn display_stack(&self, stack: &Stack) -> String {
        let mut out = String::from("[");
        for (i, symbol) in stack.as_slice().iter().enumerate() {
            if i != 0 {
                out.push_str(", ");
            }
            out.push_str(self.symbol_name(*symbol));
        }
        out.push(']');
        out
    }

    /// e.g. `δ(q0, a, Z) -> (q0, A Z)`
    pub fn display_transition(&self, transition: &Transition) -> String {
        let letter = transition
            .letter
            .map(String::from)
            .unwrap_or_else(|| EPSILON_LOWER.to_string());
        let top = transition
            .top
            .map(|s| self.symbol_name(s))
            .unwrap_or(EPSILON_LOWER);
        let push = if transition.push.is_empty() {
            EPSILON_LOWER.to_string()
        } else {
            transition
                .push
                .iter()
                .map(|symbol| self.symbol_name(*symbol))
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!(
            "{DELTA_LOWER}({}, {letter}, {top}) -> ({}, {push})",
            self.state_name(transition.from),
            self.state_name(transition.to),
        )
    }

    /// Deserializes and validates a JSON document, returning the definition
    /// with any warnings produced on the way.
    pub fn from_json(src: &str) -> Result<(Pda, Logs), LoadError> {
        let mut ctx = Context::new(src);
        match loader::parse(&mut ctx) {
            Some(pda) => Ok((pda, ctx.into_logs())),
            None => Err(LoadError::Invalid(ctx.into_logs())),
        }
    }

    pub fn compile(document: &Document, ctx: &mut Context<'_>) -> Option<Pda> {
        let mut states: HashMap<&str, State> = HashMap::new();
        let mut state_names = Vec::new();
        let mut symbols: HashMap<&str, Symbol> = HashMap::new();
        let mut symbol_names = Vec::new();
        let mut alphabet = HashSet::new();

        let field = Field::new(ast::STATES);
        for (i, name) in document.states.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                ctx.emit_error("state name cannot be empty", field.index(i));
                continue;
            }
            let Ok(id) = u16::try_from(state_names.len()) else {
                ctx.emit_error("too many states defined", field.index(i));
                break;
            };
            match states.entry(name) {
                Entry::Occupied(_) => {
                    ctx.emit_error(format!("state {name:?} redefined"), field.index(i));
                }
                Entry::Vacant(entry) => {
                    entry.insert(State(id));
                    state_names.push(name.to_string());
                }
            }
        }
        if document.states.is_empty() {
            ctx.emit_error("states cannot be empty", field);
        }

        let field = Field::new(ast::INPUT_ALPHABET);
        for (i, letter) in document.input_alphabet.iter().enumerate() {
            let letter = letter.trim();
            let mut chars = letter.chars();
            let (Some(char), None) = (chars.next(), chars.next()) else {
                ctx.emit_error(
                    format!("letter {letter:?} must be exactly one character"),
                    field.index(i),
                );
                continue;
            };
            if letter == EPSILON_LOWER {
                ctx.emit_error(
                    format!("{EPSILON_LOWER:?} is reserved for epsilon"),
                    field.index(i),
                );
            } else if !alphabet.insert(char) {
                ctx.emit_error(format!("letter {letter:?} redefined"), field.index(i));
            }
        }
        if document.input_alphabet.is_empty() {
            ctx.emit_warning(
                "input alphabet is empty, only the empty string can be read",
                field,
            );
        }

        let field = Field::new(ast::STACK_ALPHABET);
        for (i, name) in document.stack_alphabet.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                ctx.emit_error("stack symbol cannot be empty", field.index(i));
                continue;
            }
            if name == EPSILON_LOWER || name.contains(char::is_whitespace) {
                ctx.emit_error(
                    format!("stack symbol {name:?} cannot be {EPSILON_LOWER:?} or contain whitespace"),
                    field.index(i),
                );
                continue;
            }
            let Ok(id) = u16::try_from(symbol_names.len()) else {
                ctx.emit_error("too many stack symbols defined", field.index(i));
                break;
            };
            match symbols.entry(name) {
                Entry::Occupied(_) => {
                    ctx.emit_error(format!("stack symbol {name:?} redefined"), field.index(i));
                }
                Entry::Vacant(entry) => {
                    entry.insert(Symbol(id));
                    symbol_names.push(name.to_string());
                }
            }
        }
        if document.stack_alphabet.is_empty() {
            ctx.emit_error("stack alphabet cannot be empty", field);
        }

        let field = Field::new(ast::INITIAL_STATE);
        let initial = document.initial_state.trim();
        let initial_state = if initial.is_empty() {
            ctx.emit_error("initial state not defined", field);
            None
        } else if let Some(state) = states.get(initial) {
            Some(*state)
        } else {
            ctx.emit_error(
                format!("initial state {initial:?} not defined as a state"),
                field,
            );
            None
        };

        let field = Field::new(ast::FINAL_STATES);
        let mut final_states = StateMap(vec![false; state_names.len()]);
        for (i, name) in document.final_states.iter().enumerate() {
            let name = name.trim();
            let Some(state) = states.get(name) else {
                ctx.emit_error(
                    format!("final state {name:?} not defined as a state"),
                    field.index(i),
                );
                continue;
            };
            if std::mem::replace(&mut final_states[*state], true) {
                ctx.emit_warning(format!("final state {name:?} repeated"), field.index(i));
            }
        }
        if document.final_states.is_empty() {
            ctx.emit_error("final states cannot be empty", field);
        }

        let state = |name: &str, field: Field, ctx: &mut Context<'_>| {
            let name = name.trim();
            let found = states.get(name).copied();
            if found.is_none() {
                ctx.emit_error(format!("state {name:?} not defined as a state"), field);
            }
            found
        };
        let symbol = |name: &str, field: Field, ctx: &mut Context<'_>| {
            let found = symbols.get(name).copied();
            if found.is_none() {
                ctx.emit_error(
                    format!("stack symbol {name:?} not defined in stack alphabet"),
                    field,
                );
            }
            found
        };

        let mut transitions = Vec::with_capacity(document.transitions.len());
        let mut seen = HashSet::new();
        for (i, record) in document.transitions.iter().enumerate() {
            let field = Field::new(ast::TRANSITIONS).index(i);

            let from = state(&record.from, field.key(ast::FROM), ctx);
            let to = state(&record.to, field.key(ast::TO), ctx);

            let letter = match record.read.trim() {
                "" | EPSILON_LOWER => Some(None),
                letter => {
                    let mut chars = letter.chars();
                    match (chars.next(), chars.next()) {
                        (Some(char), None) if alphabet.contains(&char) => Some(Some(char)),
                        (Some(_), None) => {
                            ctx.emit_error(
                                format!("letter {letter:?} not defined in input alphabet"),
                                field.key(ast::READ),
                            );
                            None
                        }
                        _ => {
                            ctx.emit_error(
                                format!("letter {letter:?} must be exactly one character"),
                                field.key(ast::READ),
                            );
                            None
                        }
                    }
                }
            };

            let top = match record.top.trim() {
                "" | EPSILON_LOWER => Some(None),
                top => symbol(top, field.key(ast::TOP), ctx).map(Some),
            };

            let mut push = Some(Vec::new());
            for name in record
                .push
                .iter()
                .flat_map(|s| s.split_whitespace())
                .filter(|s| *s != EPSILON_LOWER)
            {
                let found = symbol(name, field.key(ast::PUSH), ctx);
                push = push.zip(found).map(|(mut push, found)| {
                    push.push(found);
                    push
                });
            }

            let (Some(from), Some(letter), Some(top), Some(push), Some(to)) =
                (from, letter, top, push, to)
            else {
                continue;
            };
            let transition = Transition {
                from,
                letter,
                top,
                push,
                to,
            };
            if !seen.insert(transition.clone()) {
                ctx.emit_warning("duplicate transition", field);
                continue;
            }
            transitions.push(transition);
        }

        let initial_state = initial_state?;
        if ctx.contains_errors() {
            return None;
        }

        let mut outgoing = StateMap(vec![Vec::new(); state_names.len()]);
        for (index, transition) in transitions.iter().enumerate() {
            outgoing[transition.from].push(index);
        }

        Some(Pda {
            initial_state,
            state_names: StateMap(state_names),
            symbol_names: SymbolMap(symbol_names),
            final_states,
            transitions,
            outgoing,
        })
    }
}
