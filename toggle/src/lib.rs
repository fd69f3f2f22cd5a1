#![cfg_attr(not(test), no_std)]

mod debounce;
mod mapping;

use defmt::Format;
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Sender};
use pin_interface::{Level, PinSubsystem};

pub use debounce::{DebounceState, DebounceWindow};
pub use mapping::{MappingError, PinMapping, Route};

/// Outcome of a debounce decision, reported on the controller's channel.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEvent<P> {
    Toggled { input: P, output: P, level: Level },
    Bounced { input: P },
    Unmapped { input: P },
}

/// Debounces edges on the routed inputs and flips the mapped outputs.
///
/// Edges are recorded with [`ToggleController::on_edge`]. Each call to
/// [`ToggleController::tick`] advances every pending window by one tick; when a
/// window elapses the input is re-read and, if it still shows the asserted level,
/// the mapped output is set to the complement of its current level.
pub struct ToggleController<'ch, M: RawMutex, P, const ROUTES: usize, const N: usize> {
    mapping: PinMapping<P, ROUTES>,
    states: [DebounceState; ROUTES],
    window: DebounceWindow,
    asserted: Level,
    sender: Sender<'ch, M, ToggleEvent<P>, N>,
}

impl<'ch, M: RawMutex, P, const ROUTES: usize, const N: usize> ToggleController<'ch, M, P, ROUTES, N>
where
    P: Copy + Eq + Format,
{
    pub fn new(
        mapping: PinMapping<P, ROUTES>,
        window: DebounceWindow,
        sender: Sender<'ch, M, ToggleEvent<P>, N>,
    ) -> Self {
        Self {
            mapping,
            states: [DebounceState::Idle; ROUTES],
            window,
            asserted: Level::Low,
            sender,
        }
    }

    /// Level an input must still show when its window elapses. Defaults to low.
    pub fn with_asserted_level(mut self, asserted: Level) -> Self {
        self.asserted = asserted;
        self
    }

    /// Starts (or restarts) the debounce window of the route `fired` belongs to.
    ///
    /// Ticks are expected only while the controller is busy: the first one a full
    /// tick period after the edge that woke it, the rest a full period apart. An
    /// edge arriving while ticks are already running gets one extra tick, since the
    /// next tick may come at any point of its period.
    pub fn on_edge(&mut self, fired: P) {
        match self.mapping.index_of(fired) {
            Some(index) => {
                self.states[index] = if self.is_idle() {
                    DebounceState::start(self.window)
                } else {
                    DebounceState::start_between_ticks(self.window)
                };
            }
            None => {
                self.sender.try_send(ToggleEvent::Unmapped { input: fired }).ok();
            }
        }
    }

    pub fn tick<S: PinSubsystem<Pin = P>>(&mut self, pins: &mut S) {
        for (route, state) in self.mapping.routes().iter().zip(self.states.iter_mut()) {
            if !state.advance() {
                continue;
            }

            let event = if pins.input_level(route.input) == self.asserted {
                let level = !pins.output_level(route.output);
                pins.set_output_level(route.output, level);

                ToggleEvent::Toggled {
                    input: route.input,
                    output: route.output,
                    level,
                }
            } else {
                ToggleEvent::Bounced { input: route.input }
            };

            // only fails if full. a dropped report never affects the pins
            self.sender.try_send(event).ok();
        }
    }

    /// True when no route is waiting for its window to elapse.
    pub fn is_idle(&self) -> bool {
        self.states.iter().all(|state| *state == DebounceState::Idle)
    }

    pub fn state(&self, input: P) -> Option<DebounceState> {
        self.mapping.index_of(input).map(|index| self.states[index])
    }
}
