//! Alert rules evaluated against every matched event.

use crate::types::MatchedEvent;

/// A single trigger condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertRule {
    /// Fires when the edit was made by exactly this user (case-sensitive).
    TargetUser(String),
    /// Fires when `|size_delta| >= threshold` bytes.
    LargeEdit { threshold: u64 },
}

impl AlertRule {
    /// The reason string if the rule fires for `event`.
    pub fn check(&self, event: &MatchedEvent) -> Option<String> {
        match self {
            Self::TargetUser(user) => (event.event().user.as_deref() == Some(user.as_str()))
                .then(|| format!("Edit by target user {user}")),
            Self::LargeEdit { threshold } => (event.size_delta().unsigned_abs() >= *threshold)
                .then(|| format!("Large edit (|Δ| >= {threshold} bytes)")),
        }
    }
}

/// Ordered list of rules. Reasons come out in the order rules were added.
#[derive(Debug, Clone, Default)]
pub struct AlertRuleSet {
    rules: Vec<AlertRule>,
}

impl AlertRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target-user rule followed by the large-edit rule.
    pub fn standard(target_user: impl Into<String>, size_threshold: u64) -> Self {
        Self::new()
            .with(AlertRule::TargetUser(target_user.into()))
            .with(AlertRule::LargeEdit {
                threshold: size_threshold,
            })
    }

    pub fn with(mut self, rule: AlertRule) -> Self {
        self.push(rule);
        self
    }

    /// Append a rule after all existing ones.
    pub fn push(&mut self, rule: AlertRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Every rule is checked; an empty result means no alert.
    pub fn evaluate(&self, event: &MatchedEvent) -> Vec<String> {
        self.rules.iter().filter_map(|rule| rule.check(event)).collect()
    }
}
