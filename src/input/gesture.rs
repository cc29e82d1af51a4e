//! Hand-gesture launch trigger. The recogniser itself lives outside this
//! crate; it feeds labelled observations here.

/// Minimum recogniser confidence for an observation to count.
pub const MIN_SCORE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    ClosedFist,
    OpenPalm,
    Other,
}

impl Gesture {
    /// Map a recogniser label such as `Closed_Fist` or `open-palm`.
    pub fn from_label(label: &str) -> Self {
        let norm: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match norm.as_str() {
            "closedfist" | "fist" => Gesture::ClosedFist,
            "openpalm" | "palm" => Gesture::OpenPalm,
            _ => Gesture::Other,
        }
    }
}

/// Fires once on every closed-fist to open-palm transition.
#[derive(Debug, Default)]
pub struct GestureTrigger {
    last: Option<Gesture>,
}

impl GestureTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation. Returns true when a launch should fire.
    pub fn observe(&mut self, gesture: Gesture, score: f32) -> bool {
        if score <= MIN_SCORE {
            return false;
        }
        let fired = self.last == Some(Gesture::ClosedFist) && gesture == Gesture::OpenPalm;
        if self.last != Some(gesture) {
            log::debug!("gesture {:?} -> {:?} ({:.2})", self.last, gesture, score);
        }
        self.last = Some(gesture);
        fired
    }

    pub fn last(&self) -> Option<Gesture> {
        self.last
    }
}
