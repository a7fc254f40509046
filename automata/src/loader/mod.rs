use std::{fmt::Display, path::PathBuf};

use crate::{
    automatan::pda::Pda,
    loader::log::{LogEntry, LogSink, Logs},
};

pub mod ast;
pub mod log;

pub const EPSILON_LOWER: &str = "ε";
pub const DELTA_LOWER: &str = "δ";

/// Dotted path to a value inside the definition document, e.g.
/// `transicoes[2].leitura`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Field(String);

impl Field {
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}.{key}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Field(Field),
    Source { line: usize, column: usize },
}

impl From<Field> for Location {
    fn from(value: Field) -> Self {
        Location::Field(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read automaton definition {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid automaton definition ({} error(s))", .0.errors().count())]
    Invalid(Logs),
}

pub struct Context<'a> {
    logs: Logs,
    src: &'a str,
}

impl<'a> LogSink for Context<'a> {
    fn emit(&mut self, entry: LogEntry) -> &mut LogEntry {
        self.logs.emit(entry)
    }
}

impl<'a> Context<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            logs: Logs::new(),
            src,
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn logs(&self) -> &Logs {
        &self.logs
    }

    pub fn logs_display(&self) -> impl Iterator<Item = log::LogEntryDisplay<'_>> {
        self.logs.displayable_with(self.src)
    }

    pub fn contains_errors(&self) -> bool {
        self.logs.contains_errors()
    }

    pub fn into_logs(self) -> Logs {
        self.logs
    }
}

pub fn read_source(path: impl Into<PathBuf>) -> Result<String, LoadError> {
    let path = path.into();
    std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })
}

/// Deserializes and validates the document held by `ctx`.
///
/// Every problem found is emitted into `ctx`; `None` is returned iff at
/// least one of them is an error.
pub fn parse(ctx: &mut Context<'_>) -> Option<Pda> {
    let document: ast::Document = match serde_json::from_str(ctx.src()) {
        Ok(document) => document,
        Err(err) => {
            let message = err.to_string();
            // the position is rendered from the location instead
            let message = match message.rsplit_once(" at line ") {
                Some((message, _)) => message.to_string(),
                None => message,
            };
            let location = Location::Source {
                line: err.line(),
                column: err.column(),
            };
            let entry = ctx.emit_error(format!("malformed definition: {message}"), location);
            if err.is_data() {
                entry.emit_help_locless(format!(
                    "expected the fields '{}', '{}', '{}', '{}', '{}' and '{}', with transitions made of '{}', '{}', '{}', '{}' and '{}'",
                    ast::STATES,
                    ast::INPUT_ALPHABET,
                    ast::STACK_ALPHABET,
                    ast::INITIAL_STATE,
                    ast::FINAL_STATES,
                    ast::TRANSITIONS,
                    ast::FROM,
                    ast::READ,
                    ast::TOP,
                    ast::PUSH,
                    ast::TO,
                ));
            }
            return None;
        }
    };
    Pda::compile(&document, ctx)
}
