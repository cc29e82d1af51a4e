//! Neon heart fireworks for the terminal.
//!
//! Launch requests from keys, clicks, formations, gestures or the auto timer
//! go into a [`sim::TriggerQueue`]. Once per frame [`sim::Fireworks`] drains
//! it into rockets, bursts arrived rockets into heart-shaped particles and
//! paints everything onto a [`canvas::Canvas`] with additive blending over a
//! fading trail. [`present::Presenter`] puts the result on screen as
//! half-block cells over the word mosaic.

pub mod audio;
pub mod canvas;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod mosaic;
pub mod palette;
pub mod present;
pub mod show;
pub mod sim;

pub use config::ShowConfig;
pub use error::{ShowError, ShowResult};
pub use events::{EventSink, ShowEvent};
pub use show::{Mode, Show};
