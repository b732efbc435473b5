use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(
    /// Acuity assigned by the classifier. Declaration order is priority order.
    TriageLevel {
        Critical => "critical",
        Urgent => "urgent",
        Stable => "stable",
    }
);

str_enum!(
    /// Colour shown on the board. `Black` is only ever set by staff.
    TriageColor {
        Red => "red",
        Yellow => "yellow",
        Green => "green",
        Black => "black",
    }
);

str_enum!(
    /// Workflow status of a queued patient.
    QueueStatus {
        Waiting => "waiting",
        InProgress => "in_progress",
        Admitted => "admitted",
        Discharged => "discharged",
        Deceased => "deceased",
    }
);

str_enum!(
    /// Hospital-wide code broadcast on activation.
    CodeKind {
        /// Cardiac or respiratory arrest, resuscitation team.
        Blue => "blue",
        /// Major trauma team.
        Trauma => "trauma",
        /// Mass casualty incident.
        Orange => "orange",
    }
);

str_enum!(
    /// Lifecycle of an emergency code activation.
    ActivationStatus {
        Armed => "armed",
        Activating => "activating",
        Active => "active",
        Responding => "responding",
        Resolved => "resolved",
    }
);

impl TriageLevel {
    /// Lower rank = seen first.
    pub fn rank(self) -> u8 {
        match self {
            TriageLevel::Critical => 0,
            TriageLevel::Urgent => 1,
            TriageLevel::Stable => 2,
        }
    }

    pub fn color(self) -> TriageColor {
        match self {
            TriageLevel::Critical => TriageColor::Red,
            TriageLevel::Urgent => TriageColor::Yellow,
            TriageLevel::Stable => TriageColor::Green,
        }
    }
}

impl TriageColor {
    /// Queue rank: red < yellow < green < black.
    pub fn rank(self) -> u8 {
        match self {
            TriageColor::Red => 0,
            TriageColor::Yellow => 1,
            TriageColor::Green => 2,
            TriageColor::Black => 3,
        }
    }

    /// Indonesian board label used on the ward displays.
    pub fn local_label(self) -> &'static str {
        match self {
            TriageColor::Red => "merah",
            TriageColor::Yellow => "kuning",
            TriageColor::Green => "hijau",
            TriageColor::Black => "hitam",
        }
    }
}

impl QueueStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueueStatus::Admitted | QueueStatus::Discharged | QueueStatus::Deceased
        )
    }

    /// Still occupying a place on the waiting board.
    pub fn is_active(self) -> bool {
        matches!(self, QueueStatus::Waiting | QueueStatus::InProgress)
    }

    pub fn can_transition_to(self, next: QueueStatus) -> bool {
        matches!(
            (self, next),
            (QueueStatus::Waiting, QueueStatus::InProgress)
                | (QueueStatus::Waiting, QueueStatus::Deceased)
                | (QueueStatus::InProgress, QueueStatus::Admitted)
                | (QueueStatus::InProgress, QueueStatus::Discharged)
                | (QueueStatus::InProgress, QueueStatus::Deceased)
        )
    }
}

impl CodeKind {
    pub fn responding_team(self) -> &'static str {
        match self {
            CodeKind::Blue => "Resuscitation team",
            CodeKind::Trauma => "Trauma team",
            CodeKind::Orange => "Incident command",
        }
    }
}
