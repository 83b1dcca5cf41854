use std::fmt;

/// Hook verdict, ordered by severity: `Allow < Warn < Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verdict {
    Allow,
    Warn,
    Block,
}

impl Verdict {
    /// Exit code understood by the host runtime.
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Allow => 0,
            Verdict::Warn => 1,
            Verdict::Block => 2,
        }
    }

    /// Parse a severity name used in config (`warn` / `block`).
    pub fn from_severity(name: &str) -> Option<Self> {
        match name {
            "warn" => Some(Verdict::Warn),
            "block" => Some(Verdict::Block),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Allow => "allow",
            Verdict::Warn => "warn",
            Verdict::Block => "block",
        };
        f.write_str(s)
    }
}

/// The result of a hook run: a verdict plus the messages written to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub messages: Vec<String>,
}

impl Outcome {
    pub fn allow() -> Self {
        Outcome {
            verdict: Verdict::Allow,
            messages: Vec::new(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Outcome {
            verdict: Verdict::Warn,
            messages: vec![message.into()],
        }
    }

    pub fn block(message: impl Into<String>) -> Self {
        Outcome {
            verdict: Verdict::Block,
            messages: vec![message.into()],
        }
    }

    /// Combine with another outcome: most restrictive verdict wins, messages
    /// keep their order.
    pub fn merge(mut self, other: Outcome) -> Self {
        self.verdict = self.verdict.max(other.verdict);
        self.messages.extend(other.messages);
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code()
    }

    /// Text for stderr. Empty for a silent allow.
    pub fn stderr_text(&self) -> String {
        self.messages.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::allow().exit_code(), 0);
        assert_eq!(Outcome::warn("w").exit_code(), 1);
        assert_eq!(Outcome::block("b").exit_code(), 2);
    }

    #[test]
    fn verdict_ordering_is_severity() {
        assert!(Verdict::Allow < Verdict::Warn);
        assert!(Verdict::Warn < Verdict::Block);
    }

    #[test]
    fn merge_takes_most_restrictive_and_keeps_messages() {
        let merged = Outcome::warn("first")
            .merge(Outcome::block("second"))
            .merge(Outcome::allow());
        assert_eq!(merged.verdict, Verdict::Block);
        assert_eq!(merged.messages, vec!["first", "second"]);
        assert_eq!(merged.stderr_text(), "first\nsecond");
    }

    #[test]
    fn severity_names() {
        assert_eq!(Verdict::from_severity("warn"), Some(Verdict::Warn));
        assert_eq!(Verdict::from_severity("block"), Some(Verdict::Block));
        assert_eq!(Verdict::from_severity("allow"), None);
    }
}
