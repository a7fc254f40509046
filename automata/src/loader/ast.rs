//! Serde model of the JSON automaton document.
//!
//! Fields are deserialized verbatim; trimming and every semantic check
//! happen when the document is compiled into a [`crate::automatan::pda::Pda`].

use serde::Deserialize;
use serde_with::{OneOrMany, formats::PreferMany, serde_as};

pub const STATES: &str = "estados";
pub const INPUT_ALPHABET: &str = "alfabeto_entrada";
pub const STACK_ALPHABET: &str = "alfabeto_pilha";
pub const INITIAL_STATE: &str = "estado_inicial";
pub const FINAL_STATES: &str = "estados_finais";
pub const TRANSITIONS: &str = "transicoes";

pub const FROM: &str = "estado_origem";
pub const READ: &str = "leitura";
pub const TOP: &str = "topo_pilha";
pub const PUSH: &str = "substituir_topo";
pub const TO: &str = "estado_destino";

#[derive(Clone, Debug, Deserialize)]
pub struct Document {
    #[serde(rename = "estados", alias = "states")]
    pub states: Vec<String>,
    #[serde(rename = "alfabeto_entrada", alias = "input_alphabet")]
    pub input_alphabet: Vec<String>,
    #[serde(rename = "alfabeto_pilha", alias = "stack_alphabet")]
    pub stack_alphabet: Vec<String>,
    #[serde(rename = "estado_inicial", alias = "initial_state")]
    pub initial_state: String,
    #[serde(rename = "estados_finais", alias = "final_states")]
    pub final_states: Vec<String>,
    #[serde(rename = "transicoes", alias = "transitions")]
    pub transitions: Vec<TransitionRecord>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct TransitionRecord {
    #[serde(rename = "estado_origem", alias = "from")]
    pub from: String,
    /// Empty means epsilon.
    #[serde(rename = "leitura", alias = "read")]
    pub read: String,
    /// Empty means the stack is neither inspected nor popped.
    #[serde(rename = "topo_pilha", alias = "top")]
    pub top: String,
    /// One string or a list of strings, each split on whitespace into
    /// symbols. The first symbol ends up on top.
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(rename = "substituir_topo", alias = "push")]
    pub push: Vec<String>,
    #[serde(rename = "estado_destino", alias = "to")]
    pub to: String,
}
