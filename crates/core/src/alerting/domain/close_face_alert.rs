use crate::shared::clock::Timestamp;

/// Payload handed to an alert sink when the policy fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloseFaceAlert {
    pub timestamp: Timestamp,
    /// Closest face distance in the frame that triggered the alert.
    pub distance_cm: f64,
}

/// Per-frame proximity classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Proximity {
    Close,
    Far,
}

/// Outcome of feeding one frame to the alert policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlertDecision {
    /// The frame was close and the policy was armed: deliver this alert.
    Fired(CloseFaceAlert),
    /// The frame was close but an earlier alert is still cooling down.
    Suppressed,
    /// No face was close.
    Clear,
}

impl AlertDecision {
    pub fn fired(&self) -> Option<&CloseFaceAlert> {
        match self {
            AlertDecision::Fired(alert) => Some(alert),
            _ => None,
        }
    }

    pub fn proximity(&self) -> Proximity {
        match self {
            AlertDecision::Clear => Proximity::Far,
            _ => Proximity::Close,
        }
    }
}
