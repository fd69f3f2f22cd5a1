#![cfg_attr(not(test), no_std)]

use core::fmt::Debug;

use defmt::Format;
use heapless::Vec;
use pin_interface::{Level, PinConfig, PinError, PinHandle, PinMode, PinSubsystem};

#[derive(Debug, Clone, Copy)]
struct SimPin<P> {
    pin: P,
    mode: Option<PinMode>,
    level: Level,
    listening: bool,
}

/// In-memory pin subsystem for up to `N` pins.
///
/// Inputs are driven with [`SimPins::press`] and [`SimPins::release`]. When the
/// transition matches the pin's edge trigger and the pin is listening, the fired
/// pin is returned, standing in for the interrupt dispatch of a real board.
pub struct SimPins<P, const N: usize> {
    pins: Vec<SimPin<P>, N>,
    writes: usize,
}

impl<P, const N: usize> SimPins<P, N>
where
    P: Copy + Eq + Format + Debug + 'static,
{
    /// Creates a board with the given pins, all unclaimed.
    pub fn new(board: &[P]) -> Self {
        let mut pins = Vec::new();
        for &pin in board {
            let sim_pin = SimPin {
                pin,
                mode: None,
                level: Level::Low,
                listening: false,
            };
            if pins.push(sim_pin).is_err() {
                panic!("SimPins capacity {} exceeded", N);
            }
        }

        Self { pins, writes: 0 }
    }

    fn find(&self, pin: P) -> Option<&SimPin<P>> {
        self.pins.iter().find(|sim_pin| sim_pin.pin == pin)
    }

    fn find_mut(&mut self, pin: P) -> Option<&mut SimPin<P>> {
        self.pins.iter_mut().find(|sim_pin| sim_pin.pin == pin)
    }

    fn open_input(&self, pin: P) -> &SimPin<P> {
        match self.find(pin) {
            Some(sim_pin) if matches!(sim_pin.mode, Some(PinMode::Input { .. })) => sim_pin,
            _ => panic!("{:?} is not an open input", pin),
        }
    }

    fn open_input_mut(&mut self, pin: P) -> &mut SimPin<P> {
        match self.find_mut(pin) {
            Some(sim_pin) if matches!(sim_pin.mode, Some(PinMode::Input { .. })) => sim_pin,
            _ => panic!("{:?} is not an open input", pin),
        }
    }

    fn open_output(&self, pin: P) -> &SimPin<P> {
        match self.find(pin) {
            Some(sim_pin) if matches!(sim_pin.mode, Some(PinMode::Output { .. })) => sim_pin,
            _ => panic!("{:?} is not an open output", pin),
        }
    }

    fn open_output_mut(&mut self, pin: P) -> &mut SimPin<P> {
        match self.find_mut(pin) {
            Some(sim_pin) if matches!(sim_pin.mode, Some(PinMode::Output { .. })) => sim_pin,
            _ => panic!("{:?} is not an open output", pin),
        }
    }

    /// Drives an input low. Returns the pin if this fires its edge trigger.
    pub fn press(&mut self, pin: P) -> Option<P> {
        self.drive(pin, Level::Low)
    }

    /// Drives an input high. Returns the pin if this fires its edge trigger.
    pub fn release(&mut self, pin: P) -> Option<P> {
        self.drive(pin, Level::High)
    }

    pub fn drive(&mut self, pin: P, level: Level) -> Option<P> {
        let sim_pin = self.open_input_mut(pin);
        let from = sim_pin.level;
        sim_pin.level = level;

        match sim_pin.mode {
            Some(PinMode::Input { edge, .. }) if sim_pin.listening && edge.fires(from, level) => {
                Some(pin)
            }
            _ => None,
        }
    }

    pub fn is_listening(&self, pin: P) -> bool {
        self.find(pin).is_some_and(|sim_pin| sim_pin.listening)
    }

    /// Number of output writes since the board was created.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl<P, const N: usize> PinSubsystem for SimPins<P, N>
where
    P: Copy + Eq + Format + Debug + 'static,
{
    type Pin = P;

    fn open(&mut self, table: &'static [PinConfig<P>]) -> Result<PinHandle<P>, PinError<P>> {
        // Check the whole table before claiming so a failed open claims nothing.
        for (index, config) in table.iter().enumerate() {
            let sim_pin = self
                .find(config.pin)
                .ok_or(PinError::Unavailable(config.pin))?;

            let repeated = table[..index].iter().any(|other| other.pin == config.pin);
            if sim_pin.mode.is_some() || repeated {
                return Err(PinError::AlreadyOpen(config.pin));
            }
        }

        for config in table {
            if let Some(sim_pin) = self.find_mut(config.pin) {
                sim_pin.mode = Some(config.mode);
                sim_pin.level = match config.mode {
                    PinMode::Input { pull, .. } => pull.idle_level(),
                    PinMode::Output { initial, .. } => initial,
                };
            }
        }

        Ok(PinHandle::new(table))
    }

    fn register_edge_listener(&mut self, handle: &PinHandle<P>) -> Result<(), PinError<P>> {
        if handle.inputs().next().is_none() {
            return Err(PinError::NoEdgeInputs);
        }

        for config in handle.inputs() {
            match self.find(config.pin) {
                Some(sim_pin) if sim_pin.mode == Some(config.mode) => {}
                _ => return Err(PinError::NotOpen(config.pin)),
            }
        }

        for config in handle.inputs() {
            if let Some(sim_pin) = self.find_mut(config.pin) {
                sim_pin.listening = true;
            }
        }

        Ok(())
    }

    fn input_level(&self, pin: P) -> Level {
        self.open_input(pin).level
    }

    fn output_level(&self, pin: P) -> Level {
        self.open_output(pin).level
    }

    fn set_output_level(&mut self, pin: P, level: Level) {
        self.open_output_mut(pin).level = level;
        self.writes += 1;
    }
}

#[cfg(test)]
mod test;
