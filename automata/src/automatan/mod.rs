pub mod pda;
pub mod simulate;
pub mod stack;

pub const DEFAULT_STEP_BUDGET: usize = 10_000;

/// How the configuration space is explored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Breadth first over every applicable transition.
    #[default]
    Exhaustive,
    /// Only ever follow the first applicable transition.
    Greedy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Maximum number of configurations processed before the remaining
    /// ones are finalized as step limit exceeded.
    pub step_budget: usize,
    pub policy: Policy,
}

impl Options {
    pub const fn exhaustive(step_budget: usize) -> Self {
        Self {
            step_budget,
            policy: Policy::Exhaustive,
        }
    }

    pub const fn greedy(step_budget: usize) -> Self {
        Self {
            step_budget,
            policy: Policy::Greedy,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::exhaustive(DEFAULT_STEP_BUDGET)
    }
}

pub trait Get<Idx> {
    type Output;
    fn get(&self, idx: Idx) -> Option<&Self::Output>;
}

macro_rules! index {
    ($ty: ident, $self:ident, $collection: expr, $index_calc: expr, $index: pat = $index_ty: ty) => {
        impl<T> Get<$index_ty> for $ty<T> {
            type Output = T;
            fn get(&$self, $index: $index_ty) -> Option<&T>{
                $collection.get($index_calc)
            }
        }

        impl<T> std::ops::Index<$index_ty> for $ty<T>{
            type Output = T;

            fn index(& $self, $index: $index_ty) -> &T{
                &$collection[$index_calc]
            }
        }

        impl<T> std::ops::IndexMut<$index_ty> for $ty<T>{
            fn index_mut(&mut $self, $index: $index_ty) -> &mut T{
                &mut $collection[$index_calc]
            }
        }
    };
}

/// Interned state identifier, only meaningful for the [`pda::Pda`] that created it.
#[derive(Clone, Debug, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct State(pub(crate) u16);

/// Interned stack symbol identifier, only meaningful for the [`pda::Pda`] that created it.
#[derive(Clone, Debug, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol(pub(crate) u16);

impl State {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct StateMap<T>(pub(crate) Vec<T>);

index!(StateMap, self, self.0, index.0 as usize, index = State);

impl<T> StateMap<T> {
    pub fn entries(&self) -> impl Iterator<Item = (State, &T)> {
        self.0.iter().enumerate().map(|(i, v)| (State(i as u16), v))
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolMap<T>(pub(crate) Vec<T>);

index!(SymbolMap, self, self.0, index.0 as usize, index = Symbol);

impl<T> SymbolMap<T> {
    pub fn entries(&self) -> impl Iterator<Item = (Symbol, &T)> {
        self.0.iter().enumerate().map(|(i, v)| (Symbol(i as u16), v))
    }
}
