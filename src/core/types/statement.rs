use std::fmt;

use serde::Serialize;

/// A single statement in the program under analysis, identified by its source
/// file and line number. Two `Statement`s with the same file and line are the
/// same statement, so the type is usable as a set or map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Statement {
    pub file: String,
    pub line: u32,
}

impl Statement {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
