use std::collections::{HashMap, HashSet};
use std::fmt;

use super::{Chain, ChainBook, Step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    EmptyChain,
    EmptyCommand,
    UnknownReference(String),
    Cycle(Vec<String>),
    /// A parallel label that appears again after a different step.
    SplitParallelGroup(String),
}

/// A problem in one chain; `step` is the 0-based index when it applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainIssue {
    pub chain: String,
    pub step: Option<usize>,
    pub kind: IssueKind,
}

impl fmt::Display for ChainIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chain)?;
        if let Some(step) = self.step {
            write!(f, " step {}", step + 1)?;
        }
        match &self.kind {
            IssueKind::EmptyChain => write!(f, ": chain has no steps"),
            IssueKind::EmptyCommand => write!(f, ": command is empty"),
            IssueKind::UnknownReference(to) => write!(f, ": references unknown chain '{to}'"),
            IssueKind::Cycle(path) => write!(f, ": reference cycle {}", path.join(" -> ")),
            IssueKind::SplitParallelGroup(label) => write!(
                f,
                ": parallel label '{label}' is reused after other steps and will run as a separate group"
            ),
        }
    }
}

impl ChainBook {
    /// Check every chain; issues are ordered by chain name then step.
    pub fn validate(&self) -> Vec<ChainIssue> {
        let mut issues = Vec::new();
        for (name, chain) in self.iter() {
            let first = issues.len();
            let issue = |step: Option<usize>, kind| ChainIssue {
                chain: name.to_string(),
                step,
                kind,
            };

            if chain.steps.is_empty() {
                issues.push(issue(None, IssueKind::EmptyChain));
            }

            for (idx, step) in chain.steps.iter().enumerate() {
                match step {
                    Step::Command(command) | Step::Task { command, .. } => {
                        if command.trim().is_empty() {
                            issues.push(issue(Some(idx), IssueKind::EmptyCommand));
                        }
                    }
                    Step::Chain { chain: target } => {
                        if self.get(target).is_none() {
                            issues.push(issue(
                                Some(idx),
                                IssueKind::UnknownReference(target.clone()),
                            ));
                        }
                    }
                }
            }

            for (idx, label) in split_labels(&self.labels(name, chain)) {
                issues.push(issue(Some(idx), IssueKind::SplitParallelGroup(label)));
            }

            if let Some(cycle) = self.cycle_through(name) {
                issues.push(issue(None, IssueKind::Cycle(cycle)));
            }
            issues[first..].sort_by_key(|i| i.step.unwrap_or(usize::MAX));
        }
        issues
    }

    /// Parallel label of every step `plan` would see, keyed by the declared
    /// step it comes from. References that cannot be expanded count as one
    /// unlabeled step.
    fn labels(&self, name: &str, chain: &Chain) -> Vec<(usize, Option<String>)> {
        let expandable = self.expand(name).is_ok();
        let mut labels = Vec::new();
        for (idx, step) in chain.steps.iter().enumerate() {
            match step {
                Step::Command(_) => labels.push((idx, None)),
                Step::Task { parallel, .. } => labels.push((idx, parallel.clone())),
                Step::Chain { chain: target } => match self.expand(target) {
                    Ok(steps) if expandable => {
                        labels.extend(steps.into_iter().map(|s| (idx, s.parallel)));
                    }
                    _ => labels.push((idx, None)),
                },
            }
        }
        labels
    }

    /// A reference path from `name` back to itself, if one exists.
    fn cycle_through(&self, name: &str) -> Option<Vec<String>> {
        let mut path = vec![name.to_string()];
        let mut visited = HashSet::new();
        self.find_path_to(name, name, &mut path, &mut visited).then_some(path)
    }

    fn find_path_to(
        &self,
        current: &str,
        target: &str,
        path: &mut Vec<String>,
        visited: &mut HashSet<String>,
    ) -> bool {
        if !visited.insert(current.to_string()) {
            return false;
        }
        let Some(chain) = self.get(current) else {
            return false;
        };
        for step in &chain.steps {
            let Step::Chain { chain: next } = step else {
                continue;
            };
            path.push(next.clone());
            if next == target || self.find_path_to(next, target, path, visited) {
                return true;
            }
            path.pop();
        }
        false
    }
}

/// Labels that reappear after a different step, reported once per declared
/// step. A split that lies entirely inside one inlined chain is left to that
/// chain's own report.
fn split_labels(labels: &[(usize, Option<String>)]) -> Vec<(usize, String)> {
    let mut found: Vec<(usize, String)> = Vec::new();
    let mut open: Option<&str> = None;
    // label -> declared step where its last run ended
    let mut closed: HashMap<&str, usize> = HashMap::new();
    let mut prev_idx = 0;
    for (idx, label) in labels {
        let label = label.as_deref();
        if label != open {
            if let Some(previous) = open {
                closed.insert(previous, prev_idx);
            }
            if let Some(label) = label {
                let reused = closed.get(label).is_some_and(|&ended| ended != *idx);
                if reused && !found.iter().any(|(i, l)| i == idx && l == label) {
                    found.push((*idx, label.to_string()));
                }
            }
            open = label;
        }
        prev_idx = *idx;
    }
    found
}
