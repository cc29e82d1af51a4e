//! Producers of launch requests: formations, the auto-launch timer and the
//! gesture trigger. Pointer clicks are mapped in `show`.

pub mod autolaunch;
pub mod formation;
pub mod gesture;

pub use autolaunch::AutoLauncher;
pub use formation::Formation;
pub use gesture::{Gesture, GestureTrigger};

use crate::sim::{LaunchRequest, Viewport};

/// A single launch somewhere in the middle half, bursting in the upper sky.
pub fn random_launch(viewport: Viewport) -> LaunchRequest {
    let x = viewport.width * (0.25 + fastrand::f32() * 0.5);
    let y = viewport.height * (1.0 / 6.0 + fastrand::f32() * (2.0 / 5.0 - 1.0 / 6.0));
    LaunchRequest::at(x, y)
}
