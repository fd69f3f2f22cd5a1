use defmt::Format;

/// Debounce window measured in controller ticks. Never shorter than one tick.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceWindow {
    ticks: u16,
}

impl DebounceWindow {
    pub const fn from_ticks(ticks: u16) -> Self {
        Self {
            ticks: if ticks == 0 { 1 } else { ticks },
        }
    }

    /// Rounds `window_ms` up to a whole number of `tick_ms` ticks.
    ///
    /// The window only spans `window_ms` if ticks are at least `tick_ms` apart.
    pub const fn from_millis(window_ms: u32, tick_ms: u32) -> Self {
        assert!(tick_ms > 0);

        let ticks = window_ms.div_ceil(tick_ms);
        if ticks > u16::MAX as u32 {
            Self::from_ticks(u16::MAX)
        } else {
            Self::from_ticks(ticks as u16)
        }
    }

    pub const fn ticks(&self) -> u16 {
        self.ticks
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Waiting { remaining: u16 },
}

impl DebounceState {
    pub const fn start(window: DebounceWindow) -> Self {
        DebounceState::Waiting {
            remaining: window.ticks,
        }
    }

    /// Starts a window while the tick clock is already running. The next tick may
    /// land anywhere inside its period, so it does not count towards the window.
    pub const fn start_between_ticks(window: DebounceWindow) -> Self {
        DebounceState::Waiting {
            remaining: window.ticks.saturating_add(1),
        }
    }

    /// Advances one tick. Returns true on the tick that ends the window.
    pub fn advance(&mut self) -> bool {
        match *self {
            DebounceState::Idle => false,
            DebounceState::Waiting { remaining } if remaining <= 1 => {
                *self = DebounceState::Idle;
                true
            }
            DebounceState::Waiting { remaining } => {
                *self = DebounceState::Waiting {
                    remaining: remaining - 1,
                };
                false
            }
        }
    }
}
