use serde::{Deserialize, Serialize};

use super::enums::{TriageColor, TriageLevel};

/// Output of one classification run.
///
/// Never mutated: a change to the vitals produces a new result.
/// `critical_findings` and `triggered_rules` are parallel lists in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResult {
    pub level: TriageLevel,
    pub score: u32,
    pub critical_findings: Vec<String>,
    pub triggered_rules: Vec<String>,
    pub recommendations: Vec<String>,
}

impl TriageResult {
    pub fn color(&self) -> TriageColor {
        self.level.color()
    }

    pub fn is_critical(&self) -> bool {
        self.level == TriageLevel::Critical
    }

    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.triggered_rules.iter().any(|r| r == rule_id)
    }
}
