use crate::models::{TriageLevel, TriageResult, ValidationError, VitalSigns, VitalSignsInput};

use super::recommendations::build_recommendations;
use super::rules::{evaluate_tier, Finding, Tier};

/// Score floor of the critical tier. No urgent score can reach it.
pub const CRITICAL_SCORE_BASE: u32 = 1000;

/// Score floor of the urgent tier.
pub const URGENT_SCORE_BASE: u32 = 100;

/// Classify raw vitals. Incomplete or implausible input is refused, never
/// treated as normal.
pub fn classify(input: &VitalSignsInput) -> Result<TriageResult, ValidationError> {
    let vitals = input.validate()?;
    Ok(classify_vitals(&vitals))
}

/// Classify already-validated vitals. Total and deterministic.
pub fn classify_vitals(vitals: &VitalSigns) -> TriageResult {
    let critical = evaluate_tier(Tier::Critical, vitals);
    let (level, findings) = if !critical.is_empty() {
        (TriageLevel::Critical, critical)
    } else {
        let urgent = evaluate_tier(Tier::Urgent, vitals);
        if urgent.is_empty() {
            (TriageLevel::Stable, urgent)
        } else {
            (TriageLevel::Urgent, urgent)
        }
    };

    TriageResult {
        level,
        score: score(level, &findings),
        critical_findings: findings.iter().map(|f| f.message.clone()).collect(),
        triggered_rules: findings.iter().map(|f| f.rule_id.to_string()).collect(),
        recommendations: build_recommendations(level, &findings),
    }
}

fn score(level: TriageLevel, findings: &[Finding]) -> u32 {
    let base = match level {
        TriageLevel::Critical => CRITICAL_SCORE_BASE,
        TriageLevel::Urgent => URGENT_SCORE_BASE,
        TriageLevel::Stable => 0,
    };
    base + findings.iter().map(|f| f.points).sum::<u32>()
}
