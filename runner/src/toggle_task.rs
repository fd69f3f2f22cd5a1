use defmt::{info, trace};
use embassy_executor::{SpawnError, SpawnToken};
use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Duration, Instant, Timer};
use pin_interface::EdgeSource;
use static_cell::StaticCell;
use toggle::{DebounceWindow, PinMapping, ToggleController, ToggleEvent};

use crate::hardware::{BoardPin, ROUTE_COUNT, StmPins};

// long enough for the tactile switches on the board to stop bouncing
const DEBOUNCE_WINDOW_MS: u32 = 25;
const TICK_MS: u32 = 5;

pub const TOGGLE_EVENT_CHANNEL_SIZE: usize = 8;
pub static TOGGLE_EVENT_CHANNEL: Channel<
    CriticalSectionRawMutex,
    ToggleEvent<BoardPin>,
    TOGGLE_EVENT_CHANNEL_SIZE,
> = Channel::new();

pub struct ToggleTaskState<'a, 'ch> {
    pins: StmPins<'a>,
    controller: ToggleController<
        'ch,
        CriticalSectionRawMutex,
        BoardPin,
        ROUTE_COUNT,
        TOGGLE_EVENT_CHANNEL_SIZE,
    >,
}

impl<'a, 'ch> ToggleTaskState<'a, 'ch> {
    pub fn new(
        pins: StmPins<'a>,
        controller: ToggleController<
            'ch,
            CriticalSectionRawMutex,
            BoardPin,
            ROUTE_COUNT,
            TOGGLE_EVENT_CHANNEL_SIZE,
        >,
    ) -> Self {
        Self { pins, controller }
    }
}

pub static TOGGLE_TASK_STATE: StaticCell<ToggleTaskState<'static, 'static>> = StaticCell::new();

pub fn create_task(
    pins: StmPins<'static>,
    mapping: PinMapping<BoardPin, ROUTE_COUNT>,
) -> Result<SpawnToken<impl Sized>, SpawnError> {
    let window = DebounceWindow::from_millis(DEBOUNCE_WINDOW_MS, TICK_MS);
    let controller = ToggleController::new(mapping, window, TOGGLE_EVENT_CHANNEL.sender());

    toggle_task(TOGGLE_TASK_STATE.init(ToggleTaskState::new(pins, controller)))
}

/// Owns the pins, so every LED write is serialized through this task.
#[embassy_executor::task]
pub async fn toggle_task(state: &'static mut ToggleTaskState<'static, 'static>) {
    info!(
        "Toggle task started ({}ms window, {}ms tick)",
        DEBOUNCE_WINDOW_MS, TICK_MS
    );

    let tick = Duration::from_millis(TICK_MS.into());
    let mut next_tick: Option<Instant> = None;

    loop {
        let event = match next_tick {
            None => Either::First(state.pins.wait_for_edge().await),
            Some(deadline) => select(state.pins.wait_for_edge(), Timer::at(deadline)).await,
        };

        match event {
            Either::First(pin) => {
                trace!("Edge on {}", pin);
                state.controller.on_edge(pin);

                if next_tick.is_none() && !state.controller.is_idle() {
                    next_tick = Some(Instant::now() + tick);
                }
            }
            Either::Second(()) => {
                state.controller.tick(&mut state.pins);

                // rebased on now so a late wake never fires ticks back to back
                next_tick = (!state.controller.is_idle()).then(|| Instant::now() + tick);
            }
        }
    }
}
