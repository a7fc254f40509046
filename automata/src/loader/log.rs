use std::fmt::Display;

use crate::loader::Location;

#[derive(Debug, Clone, serde::Serialize)]
pub struct Logs {
    logs: Vec<LogEntry>,
    has_error: bool,
}

pub trait LogSink {
    fn emit(&mut self, entry: LogEntry) -> &mut LogEntry;

    fn emit_error(&mut self, msg: impl Into<String>, location: impl Into<Location>) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            location: Some(location.into()),
            level: LogLevel::Error,
            child: None,
        })
    }

    fn emit_error_locless(&mut self, msg: impl Into<String>) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            location: None,
            level: LogLevel::Error,
            child: None,
        })
    }

    fn emit_warning(&mut self, msg: impl Into<String>, location: impl Into<Location>) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            location: Some(location.into()),
            level: LogLevel::Warning,
            child: None,
        })
    }

    fn emit_help_locless(&mut self, msg: impl Into<String>) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            location: None,
            level: LogLevel::Help,
            child: None,
        })
    }
}

impl LogSink for Logs {
    fn emit(&mut self, entry: LogEntry) -> &mut LogEntry {
        self.has_error |= matches!(entry.level, LogLevel::Error);
        let index = self.logs.len();
        self.logs.push(entry);
        &mut self.logs[index]
    }
}

impl Logs {
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            has_error: false,
        }
    }

    pub fn contains_errors(&self) -> bool {
        self.has_error
    }

    pub fn errors(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs
            .iter()
            .filter(|entry| matches!(entry.level, LogLevel::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs
            .iter()
            .filter(|entry| matches!(entry.level, LogLevel::Warning))
    }

    pub fn displayable_with<'a>(
        &'a self,
        src: &'a str,
    ) -> impl Iterator<Item = LogEntryDisplay<'a>> {
        self.logs.iter().map(|entry| LogEntryDisplay { src, entry })
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.logs
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Warning,
    Error,
    Help,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct LogEntry {
    pub message: String,
    pub location: Option<Location>,
    pub level: LogLevel,
    pub child: Option<Box<LogEntry>>,
}

impl LogEntry {
    /// The field path this entry points at, if it points at one.
    pub fn field(&self) -> Option<&str> {
        match &self.location {
            Some(Location::Field(field)) => Some(field.as_str()),
            _ => None,
        }
    }
}

impl LogSink for LogEntry {
    fn emit(&mut self, entry: LogEntry) -> &mut LogEntry {
        &mut **self.child.insert(Box::new(entry))
    }
}

pub struct LogEntryDisplay<'a> {
    src: &'a str,
    entry: &'a LogEntry,
}

impl<'a> Display for LogEntryDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        pub const RESET: &str = "\x1b[0;22m";
        pub const BOLD: &str = "\x1b[1m";
        pub const RED: &str = "\x1b[31m";
        pub const GREEN: &str = "\x1b[32m";
        pub const YELLOW: &str = "\x1b[33m";
        pub const CYAN: &str = "\x1b[36m";

        let mut next_entry = Some(self.entry);

        while let Some(entry) = next_entry {
            match entry.level {
                LogLevel::Help => write!(f, "{BOLD}{GREEN}help{RESET}{BOLD}: ")?,
                LogLevel::Warning => write!(f, "{BOLD}{YELLOW}warning{RESET}{BOLD}: ")?,
                LogLevel::Error => write!(f, "{BOLD}{RED}error{RESET}{BOLD}: ")?,
            }
            writeln!(f, "{}{RESET}", entry.message)?;

            match &entry.location {
                Some(Location::Field(field)) => {
                    writeln!(f, "{BOLD}{CYAN}  --> {RESET}{field}")?;
                }
                Some(Location::Source { line, column }) => {
                    // serde_json reports 1-based lines and columns
                    let text = self
                        .src
                        .lines()
                        .nth(line.saturating_sub(1))
                        .unwrap_or("");
                    let padding = line.checked_ilog10().unwrap_or(0) as usize + 1;

                    write!(f, "{BOLD}{CYAN}{line:>padding$}: {RESET}")?;
                    for char in text.chars() {
                        if char == '\t' {
                            write!(f, " ")?
                        } else {
                            write!(f, "{char}")?
                        }
                    }
                    writeln!(f)?;

                    write!(f, "{BOLD}{CYAN}")?;
                    for _ in 0..padding + 2 {
                        write!(f, " ")?;
                    }
                    for _ in 0..column.saturating_sub(1).min(text.chars().count()) {
                        write!(f, " ")?;
                    }
                    writeln!(f, "^{RESET}")?;
                }
                None => {}
            }
            next_entry = entry.child.as_deref()
        }

        Ok(())
    }
}
