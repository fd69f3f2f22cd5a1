use core::future::pending;

use defmt::{Format, info};
use embassy_futures::select::{Either, select};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{self, Output};
use embassy_stm32::{Peri, peripherals};
use pin_interface::{
    Drive, Edge, EdgeSource, Level, PinConfig, PinError, PinHandle, PinMode, PinSubsystem, Pull,
};
use toggle::Route;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPin {
    SwitchR,
    SwitchG,
    Led0,
    Led1,
}

// Both LEDs start on.
pub static LED_TABLE: [PinConfig<BoardPin>; 2] = [
    PinConfig::output(BoardPin::Led0, Level::High, Drive::Max),
    PinConfig::output(BoardPin::Led1, Level::High, Drive::Max),
];

// Switches short to ground when pressed.
pub static SWITCH_TABLE: [PinConfig<BoardPin>; 2] = [
    PinConfig::input(BoardPin::SwitchR, Pull::Up, Edge::Falling),
    PinConfig::input(BoardPin::SwitchG, Pull::Up, Edge::Falling),
];

pub const ROUTE_COUNT: usize = 2;
pub const ROUTES: [Route<BoardPin>; ROUTE_COUNT] = [
    Route::new(BoardPin::SwitchR, BoardPin::Led0),
    Route::new(BoardPin::SwitchG, BoardPin::Led1),
];

pub struct Hardware<'a> {
    pub pins: StmPins<'a>,
}

impl<'a> Hardware<'a> {
    pub fn get() -> Hardware<'a> {
        info!("Initializing");
        let peripherals = embassy_stm32::init(Default::default());

        // Nucleo-H723ZG: switches on PA3 and PC0, LED1 on PB0, LED2 on PE1
        let pins = StmPins {
            unclaimed: Unclaimed {
                pa3: Some(peripherals.PA3),
                exti3: Some(peripherals.EXTI3),
                pc0: Some(peripherals.PC0),
                exti0: Some(peripherals.EXTI0),
                pb0: Some(peripherals.PB0),
                pe1: Some(peripherals.PE1),
            },
            switch_r: None,
            switch_g: None,
            led0: None,
            led1: None,
        };

        Hardware { pins }
    }
}

struct Unclaimed<'a> {
    pa3: Option<Peri<'a, peripherals::PA3>>,
    exti3: Option<Peri<'a, peripherals::EXTI3>>,
    pc0: Option<Peri<'a, peripherals::PC0>>,
    exti0: Option<Peri<'a, peripherals::EXTI0>>,
    pb0: Option<Peri<'a, peripherals::PB0>>,
    pe1: Option<Peri<'a, peripherals::PE1>>,
}

struct Switch<'a> {
    input: ExtiInput<'a>,
    edge: Edge,
    listening: bool,
}

impl<'a> Switch<'a> {
    fn new(input: ExtiInput<'a>, edge: Edge) -> Self {
        Self {
            input,
            edge,
            listening: false,
        }
    }

    async fn wait(switch: Option<&mut Switch<'a>>) {
        match switch {
            Some(switch) if switch.listening => match switch.edge {
                Edge::Falling => switch.input.wait_for_falling_edge().await,
                Edge::Rising => switch.input.wait_for_rising_edge().await,
                Edge::Both => switch.input.wait_for_any_edge().await,
            },
            _ => pending().await,
        }
    }
}

/// Pin subsystem over the board's EXTI switches and push-pull LEDs.
pub struct StmPins<'a> {
    unclaimed: Unclaimed<'a>,
    switch_r: Option<Switch<'a>>,
    switch_g: Option<Switch<'a>>,
    led0: Option<Output<'a>>,
    led1: Option<Output<'a>>,
}

impl<'a> StmPins<'a> {
    fn is_free(&self, pin: BoardPin) -> bool {
        match pin {
            BoardPin::SwitchR => self.unclaimed.pa3.is_some() && self.unclaimed.exti3.is_some(),
            BoardPin::SwitchG => self.unclaimed.pc0.is_some() && self.unclaimed.exti0.is_some(),
            BoardPin::Led0 => self.unclaimed.pb0.is_some(),
            BoardPin::Led1 => self.unclaimed.pe1.is_some(),
        }
    }

    fn switch(&self, pin: BoardPin) -> Option<&Switch<'a>> {
        match pin {
            BoardPin::SwitchR => self.switch_r.as_ref(),
            BoardPin::SwitchG => self.switch_g.as_ref(),
            BoardPin::Led0 | BoardPin::Led1 => None,
        }
    }

    fn switch_mut(&mut self, pin: BoardPin) -> Option<&mut Switch<'a>> {
        match pin {
            BoardPin::SwitchR => self.switch_r.as_mut(),
            BoardPin::SwitchG => self.switch_g.as_mut(),
            BoardPin::Led0 | BoardPin::Led1 => None,
        }
    }

    fn led(&self, pin: BoardPin) -> Option<&Output<'a>> {
        match pin {
            BoardPin::Led0 => self.led0.as_ref(),
            BoardPin::Led1 => self.led1.as_ref(),
            BoardPin::SwitchR | BoardPin::SwitchG => None,
        }
    }

    fn led_mut(&mut self, pin: BoardPin) -> Option<&mut Output<'a>> {
        match pin {
            BoardPin::Led0 => self.led0.as_mut(),
            BoardPin::Led1 => self.led1.as_mut(),
            BoardPin::SwitchR | BoardPin::SwitchG => None,
        }
    }

    fn claim(&mut self, config: &PinConfig<BoardPin>) -> Result<(), PinError<BoardPin>> {
        let taken = PinError::AlreadyOpen(config.pin);

        match (config.pin, config.mode) {
            (BoardPin::SwitchR, PinMode::Input { pull, edge }) => {
                let pin = self.unclaimed.pa3.take().ok_or(taken)?;
                let channel = self.unclaimed.exti3.take().ok_or(taken)?;
                let input = ExtiInput::new(pin, channel, stm_pull(pull));
                self.switch_r = Some(Switch::new(input, edge));
            }
            (BoardPin::SwitchG, PinMode::Input { pull, edge }) => {
                let pin = self.unclaimed.pc0.take().ok_or(taken)?;
                let channel = self.unclaimed.exti0.take().ok_or(taken)?;
                let input = ExtiInput::new(pin, channel, stm_pull(pull));
                self.switch_g = Some(Switch::new(input, edge));
            }
            (BoardPin::Led0, PinMode::Output { initial, drive }) => {
                let pin = self.unclaimed.pb0.take().ok_or(taken)?;
                self.led0 = Some(Output::new(pin, stm_level(initial), stm_speed(drive)));
            }
            (BoardPin::Led1, PinMode::Output { initial, drive }) => {
                let pin = self.unclaimed.pe1.take().ok_or(taken)?;
                self.led1 = Some(Output::new(pin, stm_level(initial), stm_speed(drive)));
            }
            (pin, _) => return Err(PinError::Unavailable(pin)),
        }

        info!("Opened {} as {}", config.pin, config.mode);
        Ok(())
    }
}

fn supports(config: &PinConfig<BoardPin>) -> bool {
    matches!(
        (config.pin, config.mode),
        (BoardPin::SwitchR | BoardPin::SwitchG, PinMode::Input { .. })
            | (BoardPin::Led0 | BoardPin::Led1, PinMode::Output { .. })
    )
}

fn stm_pull(pull: Pull) -> gpio::Pull {
    match pull {
        Pull::None => gpio::Pull::None,
        Pull::Up => gpio::Pull::Up,
        Pull::Down => gpio::Pull::Down,
    }
}

fn stm_level(level: Level) -> gpio::Level {
    match level {
        Level::Low => gpio::Level::Low,
        Level::High => gpio::Level::High,
    }
}

fn stm_speed(drive: Drive) -> gpio::Speed {
    match drive {
        Drive::Low => gpio::Speed::Low,
        Drive::Medium => gpio::Speed::Medium,
        Drive::High => gpio::Speed::High,
        Drive::Max => gpio::Speed::VeryHigh,
    }
}

impl PinSubsystem for StmPins<'_> {
    type Pin = BoardPin;

    fn open(
        &mut self,
        table: &'static [PinConfig<BoardPin>],
    ) -> Result<PinHandle<BoardPin>, PinError<BoardPin>> {
        for (index, config) in table.iter().enumerate() {
            let repeated = table[..index].iter().any(|other| other.pin == config.pin);
            if repeated || !self.is_free(config.pin) {
                return Err(PinError::AlreadyOpen(config.pin));
            }
            if !supports(config) {
                return Err(PinError::Unavailable(config.pin));
            }
        }

        for config in table {
            self.claim(config)?;
        }

        Ok(PinHandle::new(table))
    }

    fn register_edge_listener(
        &mut self,
        handle: &PinHandle<BoardPin>,
    ) -> Result<(), PinError<BoardPin>> {
        if handle.inputs().next().is_none() {
            return Err(PinError::NoEdgeInputs);
        }

        for config in handle.inputs() {
            if self.switch(config.pin).is_none() {
                return Err(PinError::NotOpen(config.pin));
            }
        }

        for config in handle.inputs() {
            if let Some(switch) = self.switch_mut(config.pin) {
                switch.listening = true;
                info!("Listening for {} edges on {}", switch.edge, config.pin);
            }
        }

        Ok(())
    }

    fn input_level(&self, pin: BoardPin) -> Level {
        match self.switch(pin) {
            Some(switch) => Level::from(switch.input.is_high()),
            None => defmt::panic!("{} is not an open input", pin),
        }
    }

    fn output_level(&self, pin: BoardPin) -> Level {
        match self.led(pin) {
            Some(led) => Level::from(led.is_set_high()),
            None => defmt::panic!("{} is not an open output", pin),
        }
    }

    fn set_output_level(&mut self, pin: BoardPin, level: Level) {
        match self.led_mut(pin) {
            Some(led) => led.set_level(stm_level(level)),
            None => defmt::panic!("{} is not an open output", pin),
        }
    }
}

impl EdgeSource for StmPins<'_> {
    async fn wait_for_edge(&mut self) -> BoardPin {
        // The losing wait is dropped and re-armed on the next call, so an edge on
        // the other switch in between is not latched. The dispatch task comes back
        // within microseconds, and a press that lands there still bounces or
        // releases into a later edge the window re-samples.
        let Self {
            switch_r, switch_g, ..
        } = self;

        match select(Switch::wait(switch_r.as_mut()), Switch::wait(switch_g.as_mut())).await {
            Either::First(()) => BoardPin::SwitchR,
            Either::Second(()) => BoardPin::SwitchG,
        }
    }
}
