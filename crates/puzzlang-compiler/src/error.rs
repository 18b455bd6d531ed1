//! Compile diagnostics.
//!
//! Every section compiler reports into one [`Diagnostics`] list so a script
//! with several problems gets them all back from a single compile.

use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    #[strum(serialize = "syntax error")]
    Syntax,
    #[strum(serialize = "undefined reference")]
    UndefinedReference,
    #[strum(serialize = "cyclic definition")]
    Cycle,
    #[strum(serialize = "collision layer conflict")]
    LayerConflict,
    #[strum(serialize = "rule shape error")]
    RuleShape,
}

/// One located problem. Line 0 means the script as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}: {message}")]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to compile {title:?}: {} error(s)", .errors.len())]
pub struct CompileError {
    pub title: String,
    pub errors: Vec<Diagnostic>,
}

impl CompileError {
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// `(line, message)` pairs in report order.
    pub fn lines(&self) -> Vec<(usize, String)> {
        self.errors
            .iter()
            .map(|e| (e.line, format!("{}: {}", e.kind, e.message)))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, kind: ErrorKind, line: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            line,
            message: message.into(),
        };
        log::debug!("{diagnostic}");
        self.errors.push(diagnostic);
    }

    pub fn syntax(&mut self, line: usize, message: impl Into<String>) {
        self.push(ErrorKind::Syntax, line, message);
    }

    pub fn undefined(&mut self, line: usize, name: &str) {
        self.push(
            ErrorKind::UndefinedReference,
            line,
            format!("'{name}' is not defined"),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn into_error(self, title: &str) -> CompileError {
        CompileError {
            title: title.to_string(),
            errors: self.errors,
        }
    }
}
