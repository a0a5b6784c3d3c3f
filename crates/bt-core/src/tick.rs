/// Per-tick input handed to every lifecycle hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    /// Seconds elapsed since the previous tick.
    pub delta: f32,
    /// Emit lifecycle trace events (see [`crate::TreeConfig::debug_behaviours`]).
    pub debug: bool,
}

impl TickContext {
    pub fn new(tick: u64, delta: f32) -> Self {
        Self {
            tick,
            delta,
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
