//! User-facing notices

use std::fmt;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The action went through.
    Success,

    /// Neutral information.
    Info,

    /// The action was refused locally; nothing changed.
    Warning,

    /// The action failed.
    Error,
}

/// A transient message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// How the message should be presented.
    pub level: NoticeLevel,

    /// Message text.
    pub message: String,
}

impl Notice {
    /// Build a success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    /// Build an informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    /// Build a warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    /// Build an error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Whether this notice reports a failure or refusal.
    pub const fn is_problem(&self) -> bool {
        matches!(self.level, NoticeLevel::Warning | NoticeLevel::Error)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };

        write!(f, "[{label}] {}", self.message)
    }
}
