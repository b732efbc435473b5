//! Hard-coded triage rules.
//!
//! Two tiers, evaluated in declaration order. Critical rules are always
//! evaluated first; the urgent tier only runs when none of them fired.
//! Comparison directions are clinical boundaries: strict `<` / `>`
//! everywhere except pain, which is inclusive (`>= 7`, `>= 4`).

use crate::models::{VitalKind, VitalSigns};

/// Temperature deviation is counted in hundredths of a degree.
const TEMPERATURE_UNITS_PER_DEGREE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Critical,
    Urgent,
}

/// Threshold and comparison direction of a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Fires when the value is strictly below.
    Below(f64),
    /// Fires when the value is strictly above.
    Above(f64),
    /// Fires when the value is at or above.
    AtLeast(f64),
}

impl Bound {
    fn fires(self, value: f64) -> bool {
        match self {
            Bound::Below(t) => value < t,
            Bound::Above(t) => value > t,
            Bound::AtLeast(t) => value >= t,
        }
    }

    /// Distance past the threshold; zero exactly at an inclusive bound.
    fn excess(self, value: f64) -> f64 {
        match self {
            Bound::Below(t) => t - value,
            Bound::Above(t) | Bound::AtLeast(t) => value - t,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Bound::Below(_) => "<",
            Bound::Above(_) => ">",
            Bound::AtLeast(_) => ">=",
        }
    }

    fn threshold(self) -> f64 {
        match self {
            Bound::Below(t) | Bound::Above(t) | Bound::AtLeast(t) => t,
        }
    }
}

/// One triage rule.
pub struct TriageRule {
    /// Stable identifier for the audit trail.
    pub id: &'static str,
    pub tier: Tier,
    pub vital: VitalKind,
    pub bound: Bound,
    /// Points contributed to the score when the rule fires, before deviation.
    pub weight: u32,
    pub recommendation: &'static str,
}

/// A rule that fired against a concrete set of vitals.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub rule_id: &'static str,
    pub message: String,
    pub points: u32,
    pub recommendation: &'static str,
}

impl TriageRule {
    pub fn evaluate(&self, vitals: &VitalSigns) -> Option<Finding> {
        let value = reading(vitals, self.vital);
        if !self.bound.fires(value) {
            return None;
        }
        let deviation = deviation_units(self.vital, self.bound.excess(value));
        Some(Finding {
            rule_id: self.id,
            message: format!(
                "{} {} {} ({} {})",
                self.vital.label(),
                format_value(self.vital, value),
                self.vital.unit(),
                self.bound.symbol(),
                format_value(self.vital, self.bound.threshold()),
            ),
            points: self.weight + deviation,
            recommendation: self.recommendation,
        })
    }
}

fn reading(vitals: &VitalSigns, kind: VitalKind) -> f64 {
    match kind {
        VitalKind::SystolicPressure => f64::from(vitals.systolic),
        VitalKind::DiastolicPressure => f64::from(vitals.diastolic),
        VitalKind::HeartRate => f64::from(vitals.heart_rate),
        VitalKind::RespiratoryRate => f64::from(vitals.respiratory_rate),
        VitalKind::OxygenSaturation => f64::from(vitals.oxygen_saturation),
        VitalKind::Temperature => vitals.temperature,
        VitalKind::GlasgowComaScale => f64::from(vitals.glasgow_coma_scale),
        VitalKind::PainScore => f64::from(vitals.pain_score),
    }
}

/// One point per recorded unit past the threshold: per mmHg, per beat, per
/// percent, per hundredth of a degree. Unbounded, so every worse reading
/// scores strictly higher.
fn deviation_units(kind: VitalKind, excess: f64) -> u32 {
    let scale = if kind == VitalKind::Temperature {
        TEMPERATURE_UNITS_PER_DEGREE
    } else {
        1.0
    };
    (excess * scale).round().max(0.0) as u32
}

fn format_value(kind: VitalKind, value: f64) -> String {
    if kind == VitalKind::Temperature {
        format!("{value:.1}")
    } else {
        format!("{value:.0}")
    }
}

// ── Rule registry ───────────────────────────────────────────

pub static RULES: &[TriageRule] = &[
    // Critical tier
    TriageRule {
        id: "CRIT-SBP-LOW",
        tier: Tier::Critical,
        vital: VitalKind::SystolicPressure,
        bound: Bound::Below(90.0),
        weight: 30,
        recommendation: "Establish large-bore IV access and start fluid resuscitation",
    },
    TriageRule {
        id: "CRIT-SBP-HIGH",
        tier: Tier::Critical,
        vital: VitalKind::SystolicPressure,
        bound: Bound::Above(180.0),
        weight: 25,
        recommendation: "Assess for hypertensive emergency and end-organ damage",
    },
    TriageRule {
        id: "CRIT-HR-LOW",
        tier: Tier::Critical,
        vital: VitalKind::HeartRate,
        bound: Bound::Below(50.0),
        weight: 25,
        recommendation: "Attach continuous cardiac monitoring and obtain a 12-lead ECG",
    },
    TriageRule {
        id: "CRIT-HR-HIGH",
        tier: Tier::Critical,
        vital: VitalKind::HeartRate,
        bound: Bound::Above(120.0),
        weight: 25,
        recommendation: "Attach continuous cardiac monitoring and obtain a 12-lead ECG",
    },
    TriageRule {
        id: "CRIT-RR-LOW",
        tier: Tier::Critical,
        vital: VitalKind::RespiratoryRate,
        bound: Bound::Below(10.0),
        weight: 30,
        recommendation: "Assess and secure the airway; prepare ventilatory support",
    },
    TriageRule {
        id: "CRIT-RR-HIGH",
        tier: Tier::Critical,
        vital: VitalKind::RespiratoryRate,
        bound: Bound::Above(30.0),
        weight: 25,
        recommendation: "Assess and secure the airway; prepare ventilatory support",
    },
    TriageRule {
        id: "CRIT-TEMP-LOW",
        tier: Tier::Critical,
        vital: VitalKind::Temperature,
        bound: Bound::Below(35.0),
        weight: 20,
        recommendation: "Begin active rewarming",
    },
    TriageRule {
        id: "CRIT-TEMP-HIGH",
        tier: Tier::Critical,
        vital: VitalKind::Temperature,
        bound: Bound::Above(40.0),
        weight: 20,
        recommendation: "Start active cooling and screen for sepsis",
    },
    TriageRule {
        id: "CRIT-SPO2-LOW",
        tier: Tier::Critical,
        vital: VitalKind::OxygenSaturation,
        bound: Bound::Below(90.0),
        weight: 30,
        recommendation: "Administer supplemental oxygen and titrate to SpO2 of at least 94%",
    },
    TriageRule {
        id: "CRIT-PAIN",
        tier: Tier::Critical,
        vital: VitalKind::PainScore,
        bound: Bound::AtLeast(7.0),
        weight: 15,
        recommendation: "Provide analgesia and reassess pain within 15 minutes",
    },
    TriageRule {
        id: "CRIT-GCS-LOW",
        tier: Tier::Critical,
        vital: VitalKind::GlasgowComaScale,
        bound: Bound::Below(9.0),
        weight: 35,
        recommendation: "Perform neurological assessment and protect the airway",
    },
    // Urgent tier
    TriageRule {
        id: "URG-SBP-LOW",
        tier: Tier::Urgent,
        vital: VitalKind::SystolicPressure,
        bound: Bound::Below(100.0),
        weight: 12,
        recommendation: "Recheck blood pressure and consider IV access",
    },
    TriageRule {
        id: "URG-SBP-HIGH",
        tier: Tier::Urgent,
        vital: VitalKind::SystolicPressure,
        bound: Bound::Above(160.0),
        weight: 10,
        recommendation: "Recheck blood pressure within 15 minutes",
    },
    TriageRule {
        id: "URG-HR-LOW",
        tier: Tier::Urgent,
        vital: VitalKind::HeartRate,
        bound: Bound::Below(60.0),
        weight: 10,
        recommendation: "Repeat heart rate and consider a 12-lead ECG",
    },
    TriageRule {
        id: "URG-HR-HIGH",
        tier: Tier::Urgent,
        vital: VitalKind::HeartRate,
        bound: Bound::Above(100.0),
        weight: 10,
        recommendation: "Repeat heart rate and consider a 12-lead ECG",
    },
    TriageRule {
        id: "URG-RR-LOW",
        tier: Tier::Urgent,
        vital: VitalKind::RespiratoryRate,
        bound: Bound::Below(12.0),
        weight: 12,
        recommendation: "Monitor respiratory effort",
    },
    TriageRule {
        id: "URG-RR-HIGH",
        tier: Tier::Urgent,
        vital: VitalKind::RespiratoryRate,
        bound: Bound::Above(24.0),
        weight: 10,
        recommendation: "Monitor respiratory effort",
    },
    TriageRule {
        id: "URG-TEMP-LOW",
        tier: Tier::Urgent,
        vital: VitalKind::Temperature,
        bound: Bound::Below(36.0),
        weight: 10,
        recommendation: "Provide warming blankets and recheck temperature",
    },
    TriageRule {
        id: "URG-TEMP-HIGH",
        tier: Tier::Urgent,
        vital: VitalKind::Temperature,
        bound: Bound::Above(38.0),
        weight: 10,
        recommendation: "Give antipyretics and draw blood cultures if indicated",
    },
    TriageRule {
        id: "URG-SPO2-LOW",
        tier: Tier::Urgent,
        vital: VitalKind::OxygenSaturation,
        bound: Bound::Below(95.0),
        weight: 15,
        recommendation: "Monitor pulse oximetry continuously",
    },
    TriageRule {
        id: "URG-PAIN",
        tier: Tier::Urgent,
        vital: VitalKind::PainScore,
        bound: Bound::AtLeast(4.0),
        weight: 10,
        recommendation: "Offer analgesia",
    },
    TriageRule {
        id: "URG-GCS-LOW",
        tier: Tier::Urgent,
        vital: VitalKind::GlasgowComaScale,
        bound: Bound::Below(14.0),
        weight: 15,
        recommendation: "Repeat GCS every 15 minutes",
    },
];

/// All findings of one tier, in registry order.
pub fn evaluate_tier(tier: Tier, vitals: &VitalSigns) -> Vec<Finding> {
    RULES
        .iter()
        .filter(|rule| rule.tier == tier)
        .filter_map(|rule| rule.evaluate(vitals))
        .collect()
}
