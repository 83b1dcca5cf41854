use std::fmt;

use super::{ChainBook, ChainError, ExpandedStep};
use crate::aliases::AliasTable;

/// One unit of a chain's execution plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Sequential(ExpandedStep),
    /// Steps that share a `parallel` label and may run together.
    Parallel {
        label: String,
        steps: Vec<ExpandedStep>,
    },
}

impl Stage {
    pub fn steps(&self) -> &[ExpandedStep] {
        match self {
            Stage::Sequential(step) => std::slice::from_ref(step),
            Stage::Parallel { steps, .. } => steps,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Sequential(step) => write!(f, "{step}"),
            Stage::Parallel { label, steps } => {
                write!(f, "parallel [{label}]")?;
                for step in steps {
                    write!(f, "\n  - {step}")?;
                }
                Ok(())
            }
        }
    }
}

impl ChainBook {
    /// Expand `name` and group it into stages.
    ///
    /// Runs of consecutive steps with the same `parallel` label become one
    /// stage; every unlabeled step is a stage of its own. With an alias
    /// table, commands starting with an alias are resolved through it.
    pub fn plan(&self, name: &str, aliases: Option<&AliasTable>) -> Result<Vec<Stage>, ChainError> {
        let mut stages: Vec<Stage> = Vec::new();
        for mut step in self.expand(name)? {
            if let Some(aliases) = aliases {
                step.command = aliases.expand_command(&step.command)?;
            }

            let Some(label) = step.parallel.clone() else {
                stages.push(Stage::Sequential(step));
                continue;
            };
            match stages.last_mut() {
                Some(Stage::Parallel { label: open, steps }) if *open == label => steps.push(step),
                _ => stages.push(Stage::Parallel {
                    label,
                    steps: vec![step],
                }),
            }
        }

        tracing::debug!(chain = name, stages = stages.len(), "chain planned");
        Ok(stages)
    }
}
