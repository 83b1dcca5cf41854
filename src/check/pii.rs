use crate::config::{CheckKind, PiiConfig, PiiRule, Validator};

use super::{Check, CheckContext, Finding};

/// Regex scan of written content for personal data.
pub(super) struct PiiCheck<'a> {
    config: &'a PiiConfig,
}

impl<'a> PiiCheck<'a> {
    pub(super) fn new(config: &'a PiiConfig) -> Self {
        PiiCheck { config }
    }
}

impl Check for PiiCheck<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::Pii
    }

    fn inspect(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let Some(text) = ctx.text.as_deref() else {
            return vec![];
        };
        if let Some(path) = ctx.normalized_path() {
            if self.config.ignore.is_match(path) {
                tracing::debug!(path, "pii: path ignored");
                return vec![];
            }
        }

        self.config
            .rules
            .iter()
            .filter_map(|rule| scan_rule(rule, text))
            .collect()
    }
}

/// Report the first valid hit of a rule, with the total count.
fn scan_rule(rule: &PiiRule, text: &str) -> Option<Finding> {
    let mut first: Option<(usize, String)> = None;
    let mut count = 0usize;

    for (idx, line) in text.lines().enumerate() {
        for m in rule.regex.find_iter(line) {
            if !passes(rule.validator, m.as_str()) {
                continue;
            }
            count += 1;
            if first.is_none() {
                first = Some((idx + 1, redact(m.as_str())));
            }
        }
    }

    let (line, sample) = first?;
    let message = if count == 1 {
        format!("possible {} detected ({sample})", rule.id)
    } else {
        format!("possible {} detected ({sample}, {count} occurrences)", rule.id)
    };
    Some(Finding {
        check: CheckKind::Pii,
        rule: rule.id.clone(),
        severity: rule.severity,
        line: Some(line),
        message,
    })
}

fn passes(validator: Option<Validator>, matched: &str) -> bool {
    match validator {
        None => true,
        Some(Validator::Luhn) => luhn_valid(matched),
        Some(Validator::SsnArea) => ssn_assignable(matched),
    }
}

/// Luhn checksum over the digits of `s`, requiring 13..=19 digits.
fn luhn_valid(s: &str) -> bool {
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// `AAA-GG-SSSS` with area not 000/666/9xx, group not 00, serial not 0000.
fn ssn_assignable(s: &str) -> bool {
    let mut parts = s.split('-');
    let (Some(area), Some(group), Some(serial)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    area != "000"
        && area != "666"
        && !area.starts_with('9')
        && group != "00"
        && serial != "0000"
}

/// Keep only the last four characters visible.
fn redact(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let keep = chars.len().min(4);
    let hidden = chars.len() - keep;
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i < hidden && c.is_alphanumeric() {
                '*'
            } else {
                *c
            }
        })
        .collect()
}
