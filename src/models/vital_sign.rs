use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GCS assumed when consciousness was not scored.
pub const DEFAULT_GLASGOW_COMA_SCALE: u8 = 15;

/// Pain assumed when the patient was not asked.
pub const DEFAULT_PAIN_SCORE: u8 = 0;

/// Which measurement a finding or validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalKind {
    SystolicPressure,
    DiastolicPressure,
    HeartRate,
    RespiratoryRate,
    OxygenSaturation,
    Temperature,
    GlasgowComaScale,
    PainScore,
}

impl VitalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalKind::SystolicPressure => "systolic_pressure",
            VitalKind::DiastolicPressure => "diastolic_pressure",
            VitalKind::HeartRate => "heart_rate",
            VitalKind::RespiratoryRate => "respiratory_rate",
            VitalKind::OxygenSaturation => "oxygen_saturation",
            VitalKind::Temperature => "temperature",
            VitalKind::GlasgowComaScale => "glasgow_coma_scale",
            VitalKind::PainScore => "pain_score",
        }
    }

    /// Display label used in clinical finding strings.
    pub fn label(self) -> &'static str {
        match self {
            VitalKind::SystolicPressure => "Systolic blood pressure",
            VitalKind::DiastolicPressure => "Diastolic blood pressure",
            VitalKind::HeartRate => "Heart rate",
            VitalKind::RespiratoryRate => "Respiratory rate",
            VitalKind::OxygenSaturation => "Oxygen saturation",
            VitalKind::Temperature => "Temperature",
            VitalKind::GlasgowComaScale => "Glasgow Coma Scale",
            VitalKind::PainScore => "Pain score",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            VitalKind::SystolicPressure | VitalKind::DiastolicPressure => "mmHg",
            VitalKind::HeartRate => "bpm",
            VitalKind::RespiratoryRate => "breaths/min",
            VitalKind::OxygenSaturation => "%",
            VitalKind::Temperature => "°C",
            VitalKind::GlasgowComaScale => "/15",
            VitalKind::PainScore => "/10",
        }
    }

    /// Inclusive plausibility range. Values outside are treated as entry errors.
    pub fn plausible_range(self) -> (f64, f64) {
        match self {
            VitalKind::SystolicPressure => (40.0, 300.0),
            VitalKind::DiastolicPressure => (20.0, 200.0),
            VitalKind::HeartRate => (20.0, 300.0),
            VitalKind::RespiratoryRate => (4.0, 80.0),
            VitalKind::OxygenSaturation => (0.0, 100.0),
            VitalKind::Temperature => (25.0, 45.0),
            VitalKind::GlasgowComaScale => (3.0, 15.0),
            VitalKind::PainScore => (0.0, 10.0),
        }
    }
}

impl std::fmt::Display for VitalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required vital sign: {0}")]
    MissingVital(VitalKind),

    #[error("{kind} must not be negative (got {value})")]
    Negative { kind: VitalKind, value: f64 },

    #[error("{kind} value {value} is outside the plausible range {min}-{max}")]
    OutOfRange {
        kind: VitalKind,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{0} is not a finite number")]
    NotFinite(VitalKind),

    #[error("Diastolic pressure ({diastolic}) must be below systolic ({systolic})")]
    DiastolicNotBelowSystolic { systolic: u16, diastolic: u16 },
}

/// Vital signs exactly as entered at the triage desk.
///
/// Signed integers so that a stray negative from the form surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSignsInput {
    pub blood_pressure_systolic: Option<i32>,
    pub blood_pressure_diastolic: Option<i32>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub oxygen_saturation: Option<i32>,
    pub temperature: Option<f64>,
    pub glasgow_coma_scale: Option<i32>,
    pub pain_score: Option<i32>,
}

/// A complete, validated set of vitals. Only [`VitalSignsInput::validate`]
/// produces one, so the classifier never sees a partial record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub systolic: u16,
    pub diastolic: u16,
    pub heart_rate: u16,
    pub respiratory_rate: u16,
    pub oxygen_saturation: u8,
    pub temperature: f64,
    pub glasgow_coma_scale: u8,
    pub pain_score: u8,
}

impl VitalSignsInput {
    /// Check structure and plausibility, applying the GCS/pain defaults.
    pub fn validate(&self) -> Result<VitalSigns, ValidationError> {
        let systolic = required_int(VitalKind::SystolicPressure, self.blood_pressure_systolic)?;
        let diastolic = required_int(VitalKind::DiastolicPressure, self.blood_pressure_diastolic)?;
        let heart_rate = required_int(VitalKind::HeartRate, self.heart_rate)?;
        let respiratory_rate = required_int(VitalKind::RespiratoryRate, self.respiratory_rate)?;
        let oxygen_saturation = required_int(VitalKind::OxygenSaturation, self.oxygen_saturation)?;
        let temperature = required_temperature(self.temperature)?;
        let glasgow_coma_scale = optional_int(
            VitalKind::GlasgowComaScale,
            self.glasgow_coma_scale,
            DEFAULT_GLASGOW_COMA_SCALE as i32,
        )?;
        let pain_score =
            optional_int(VitalKind::PainScore, self.pain_score, DEFAULT_PAIN_SCORE as i32)?;

        if diastolic >= systolic {
            return Err(ValidationError::DiastolicNotBelowSystolic {
                systolic: systolic as u16,
                diastolic: diastolic as u16,
            });
        }

        // Ranges above bound every value well inside the target widths.
        Ok(VitalSigns {
            systolic: systolic as u16,
            diastolic: diastolic as u16,
            heart_rate: heart_rate as u16,
            respiratory_rate: respiratory_rate as u16,
            oxygen_saturation: oxygen_saturation as u8,
            temperature,
            glasgow_coma_scale: glasgow_coma_scale as u8,
            pain_score: pain_score as u8,
        })
    }

    /// True when every primary vital has been entered.
    pub fn is_complete(&self) -> bool {
        self.blood_pressure_systolic.is_some()
            && self.blood_pressure_diastolic.is_some()
            && self.heart_rate.is_some()
            && self.respiratory_rate.is_some()
            && self.oxygen_saturation.is_some()
            && self.temperature.is_some()
    }
}

fn required_int(kind: VitalKind, value: Option<i32>) -> Result<i32, ValidationError> {
    let value = value.ok_or(ValidationError::MissingVital(kind))?;
    check_int(kind, value)
}

fn optional_int(kind: VitalKind, value: Option<i32>, default: i32) -> Result<i32, ValidationError> {
    check_int(kind, value.unwrap_or(default))
}

fn check_int(kind: VitalKind, value: i32) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative {
            kind,
            value: f64::from(value),
        });
    }
    check_range(kind, f64::from(value))?;
    Ok(value)
}

fn required_temperature(value: Option<f64>) -> Result<f64, ValidationError> {
    let kind = VitalKind::Temperature;
    let value = value.ok_or(ValidationError::MissingVital(kind))?;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(kind));
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { kind, value });
    }
    check_range(kind, value)?;
    Ok(value)
}

fn check_range(kind: VitalKind, value: f64) -> Result<(), ValidationError> {
    let (min, max) = kind.plausible_range();
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            kind,
            value,
            min,
            max,
        });
    }
    Ok(())
}
