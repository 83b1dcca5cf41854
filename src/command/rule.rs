use super::{parse, CommandSegment, ParseError};

/// A shell rule written as a command prefix, e.g. `"git push --force"`.
///
/// A segment matches when the program is the same, the rule's positionals are
/// an ordered prefix of the segment's positionals, and every rule flag appears
/// somewhere in the segment (combined short flags already expanded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRule {
    pub raw: String,
    program: String,
    positionals: Vec<String>,
    flags: Vec<String>,
}

impl ShellRule {
    /// Parse a rule string with the same shell parser used for commands.
    pub fn new(raw: &str) -> Result<Self, ParseError> {
        let mut segments = parse(raw)?;
        if segments.len() != 1 {
            return Err(ParseError(format!(
                "rule '{raw}' must name exactly one command, found {}",
                segments.len()
            )));
        }
        let segment = segments.remove(0);
        let (flags, positionals) = segment.classify_args();
        Ok(ShellRule {
            raw: raw.to_string(),
            flags: flags.into_iter().map(String::from).collect(),
            positionals: positionals.into_iter().map(String::from).collect(),
            program: segment.program,
        })
    }

    pub fn matches(&self, segment: &CommandSegment) -> bool {
        if self.program != segment.program {
            return false;
        }
        let (flags, positionals) = segment.classify_args();
        if positionals.len() < self.positionals.len() {
            return false;
        }
        let prefix_ok = self
            .positionals
            .iter()
            .zip(positionals.iter())
            .all(|(rule_tok, actual)| rule_tok == actual);
        prefix_ok && self.flags.iter().all(|f| flags.contains(&f.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(rule: &str, command: &str) -> bool {
        let rule = ShellRule::new(rule).unwrap();
        parse(command).unwrap().iter().any(|seg| rule.matches(seg))
    }

    #[test]
    fn program_only_rule_matches_any_invocation() {
        assert!(matches("curl", "curl -s https://example.com"));
        assert!(!matches("curl", "wget https://example.com"));
    }

    #[test]
    fn flags_match_in_any_order_and_combined() {
        assert!(matches("rm -rf /", "rm -fr /"));
        assert!(matches("rm -rf /", "rm -r -f /"));
        assert!(!matches("rm -rf /", "rm -r /"));
        assert!(!matches("rm -rf /", "rm -rf /tmp/build"));
    }

    #[test]
    fn subcommand_is_an_ordered_prefix() {
        assert!(matches("git push --force", "git push --force origin main"));
        assert!(matches("git push --force", "git push origin main --force"));
        assert!(!matches("git push --force", "git fetch --force"));
        assert!(!matches("git commit --no-verify", "git commit -m msg"));
    }

    #[test]
    fn matches_inside_compound_commands() {
        assert!(matches(
            "git commit --no-verify",
            "git add . && git commit --no-verify -m wip"
        ));
    }

    #[test]
    fn multi_command_rule_is_rejected() {
        assert!(ShellRule::new("git add . && git commit").is_err());
        assert!(ShellRule::new("").is_err());
    }
}
