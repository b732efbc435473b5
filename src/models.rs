pub mod enums;
pub mod queue_entry;
pub mod triage;
pub mod vital_sign;

pub use enums::{ActivationStatus, CodeKind, ParseEnumError, QueueStatus, TriageColor, TriageLevel};
pub use queue_entry::{QueueEntry, QueueError};
pub use triage::TriageResult;
pub use vital_sign::{ValidationError, VitalKind, VitalSigns, VitalSignsInput};
