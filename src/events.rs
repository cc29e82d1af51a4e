//! Fire-and-forget signals raised by the simulation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowEvent {
    /// A rocket left the ground.
    Launch,
    /// A rocket reached its burst height and spawned particles.
    Explosion,
}

/// Receiver of [`ShowEvent`]s. Implementations must not block.
pub trait EventSink {
    fn emit(&mut self, event: ShowEvent);
}

impl EventSink for Vec<ShowEvent> {
    fn emit(&mut self, event: ShowEvent) {
        self.push(event);
    }
}
