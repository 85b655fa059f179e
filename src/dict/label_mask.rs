//! Vendor specific label exclusion rules.
//!
//! Capture software writes auxiliary channels (unlabeled trajectories,
//! blank placeholder channels, ...) next to the real markers. Which channels
//! are noise depends on the software, so the rules are plain data: callers
//! may extend, replace or load them from JSON, or disable masking entirely.

use serde::{Deserialize, Serialize};

use crate::core::LabelMask;

/// How a rule matches a label (after trimming).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "value", rename_all = "snake_case")]
pub enum LabelPattern {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    /// Prefix followed by one or more ASCII digits only, e.g. `*12`.
    PrefixDigits(String),
    /// Empty or whitespace-only label.
    Blank,
}

impl LabelPattern {
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        match self {
            Self::Exact(s) => label == s,
            Self::Prefix(s) => label.starts_with(s.as_str()),
            Self::Suffix(s) => label.ends_with(s.as_str()),
            Self::Contains(s) => label.contains(s.as_str()),
            Self::PrefixDigits(s) => label
                .strip_prefix(s.as_str())
                .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())),
            Self::Blank => label.is_empty(),
        }
    }
}

/// One exclusion rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMaskRule {
    /// Case-insensitive substring of `MANUFACTURER:SOFTWARE`; `None` applies to all software.
    #[serde(default)]
    pub software: Option<String>,
    /// Data section (`POINT`, `ANALOG`); `None` applies to all sections.
    #[serde(default)]
    pub section: Option<String>,
    pub pattern: LabelPattern,
}

impl LabelMaskRule {
    /// Check whether the rule is active for a software/section pair.
    pub fn applies_to(&self, software: Option<&str>, section: &str) -> bool {
        let software_ok = match (&self.software, software) {
            (None, _) => true,
            (Some(want), Some(have)) => have.to_ascii_lowercase().contains(&want.to_ascii_lowercase()),
            (Some(_), None) => false,
        };
        let section_ok = self
            .section
            .as_deref()
            .map_or(true, |s| s.eq_ignore_ascii_case(section));
        software_ok && section_ok
    }
}

/// Ordered set of exclusion rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMaskRules {
    rules: Vec<LabelMaskRule>,
}

impl LabelMaskRules {
    /// Rule set that excludes nothing.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build from explicit rules.
    pub fn new(rules: Vec<LabelMaskRule>) -> Self {
        Self { rules }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: LabelMaskRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[LabelMaskRule] {
        &self.rules
    }

    /// Keep-mask for `labels`: `true` keeps the label, `false` excludes it.
    pub fn mask<S: AsRef<str>>(&self, labels: &[S], software: Option<&str>, section: &str) -> LabelMask {
        let active: Vec<&LabelMaskRule> = self
            .rules
            .iter()
            .filter(|r| r.applies_to(software, section))
            .collect();
        LabelMask::from_fn(labels.len(), |i| {
            let label = labels[i].as_ref();
            !active.iter().any(|r| r.pattern.matches(label))
        })
    }
}

impl Default for LabelMaskRules {
    fn default() -> Self {
        Self::new(vec![
            LabelMaskRule {
                software: None,
                section: Some("POINT".into()),
                pattern: LabelPattern::Blank,
            },
            // Vicon writes unlabeled trajectories as `*<n>`.
            LabelMaskRule {
                software: Some("vicon".into()),
                section: Some("POINT".into()),
                pattern: LabelPattern::PrefixDigits("*".into()),
            },
        ])
    }
}
