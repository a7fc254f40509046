use super::Symbol;
use super::pda::Transition;
use super::simulate::SimulationError;

/// Stack contents, bottom first. The empty stack has an epsilon top.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stack(Vec<Symbol>);

impl Stack {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a stack from its contents listed bottom first.
    pub fn from_bottom(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self(symbols.into_iter().collect())
    }

    pub fn top(&self) -> Option<Symbol> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Contents bottom first.
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }
}

impl Transition {
    /// Applies this transition's pop/push effect to a copy of `stack`.
    ///
    /// A non-epsilon `top` must be the current top of `stack`; anything else
    /// means the transition was not selected by the matcher.
    pub fn apply(&self, stack: &Stack) -> Result<Stack, SimulationError> {
        let mut next = stack.clone();
        if let Some(expected) = self.top {
            match next.0.pop() {
                Some(found) if found == expected => {}
                found => return Err(SimulationError::InternalInvariant { expected, found }),
            }
        }
        next.0.extend(self.push.iter().rev().copied());
        Ok(next)
    }
}
