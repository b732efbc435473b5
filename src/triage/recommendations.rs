use crate::models::TriageLevel;

use super::rules::Finding;

fn headline(level: TriageLevel) -> &'static str {
    match level {
        TriageLevel::Critical => "Immediate physician assessment in the resuscitation area",
        TriageLevel::Urgent => "Physician assessment within 30 minutes",
        TriageLevel::Stable => "Routine assessment in order of arrival",
    }
}

fn trailer(level: TriageLevel) -> &'static str {
    match level {
        TriageLevel::Critical => "Consider emergency code activation",
        TriageLevel::Urgent => "Re-assess vital signs every 15 minutes",
        TriageLevel::Stable => "Re-triage if the patient's condition changes",
    }
}

/// Headline, then one action per fired rule in registry order, then trailer.
/// Duplicate actions (e.g. low and high heart rate) appear once.
pub fn build_recommendations(level: TriageLevel, findings: &[Finding]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(findings.len() + 2);
    out.push(headline(level).to_string());
    for finding in findings {
        if !out.iter().any(|r| r == finding.recommendation) {
            out.push(finding.recommendation.to_string());
        }
    }
    out.push(trailer(level).to_string());
    out
}
