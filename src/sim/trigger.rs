/// A request to fire one rocket, produced by clicks, formations, gestures or
/// the auto-launch timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchRequest {
    pub x: f32,
    /// Burst height (logical units from the top).
    pub y: f32,
    /// Palette to use, taken modulo the palette count. Random when `None`.
    pub palette_index: Option<usize>,
    /// Burst size multiplier, 1.0 when `None`.
    pub scale: Option<f32>,
}

impl LaunchRequest {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            palette_index: None,
            scale: None,
        }
    }

    pub fn with_palette(mut self, index: usize) -> Self {
        self.palette_index = Some(index);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// Pending launches. Producers push; the simulation drains once per frame.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    requests: Vec<LaunchRequest>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self {
            requests: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, request: LaunchRequest) {
        self.requests.push(request);
    }

    pub fn extend(&mut self, requests: impl IntoIterator<Item = LaunchRequest>) {
        self.requests.extend(requests);
    }

    /// Take every pending request in insertion order, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<LaunchRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaunchRequest> {
        self.requests.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}
