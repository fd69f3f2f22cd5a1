#![no_std]

use core::ops::Not;

use defmt::Format;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

impl Pull {
    /// Level an unconnected input settles at.
    pub fn idle_level(self) -> Level {
        match self {
            Pull::Down => Level::Low,
            Pull::None | Pull::Up => Level::High,
        }
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Falling,
    Rising,
    Both,
}

impl Edge {
    /// Whether a transition from `from` to `to` fires this edge trigger.
    pub fn fires(self, from: Level, to: Level) -> bool {
        match (self, from, to) {
            (Edge::Falling | Edge::Both, Level::High, Level::Low) => true,
            (Edge::Rising | Edge::Both, Level::Low, Level::High) => true,
            _ => false,
        }
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    Low,
    Medium,
    High,
    Max,
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input { pull: Pull, edge: Edge },
    Output { initial: Level, drive: Drive },
}

/// One row of a declarative pin table.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig<P> {
    pub pin: P,
    pub mode: PinMode,
}

impl<P> PinConfig<P> {
    pub const fn input(pin: P, pull: Pull, edge: Edge) -> Self {
        Self {
            pin,
            mode: PinMode::Input { pull, edge },
        }
    }

    pub const fn output(pin: P, initial: Level, drive: Drive) -> Self {
        Self {
            pin,
            mode: PinMode::Output { initial, drive },
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self.mode, PinMode::Input { .. })
    }

    pub fn is_output(&self) -> bool {
        matches!(self.mode, PinMode::Output { .. })
    }
}

/// Handle onto a table that a [`PinSubsystem`] has opened.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinHandle<P: 'static> {
    table: &'static [PinConfig<P>],
}

impl<P: Copy + 'static> PinHandle<P> {
    /// Returned by [`PinSubsystem::open`] once every pin in `table` is claimed.
    pub fn new(table: &'static [PinConfig<P>]) -> Self {
        Self { table }
    }

    pub fn inputs(&self) -> impl Iterator<Item = &'static PinConfig<P>> + use<P> {
        self.table.iter().filter(|config| config.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &'static PinConfig<P>> + use<P> {
        self.table.iter().filter(|config| config.is_output())
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError<P> {
    /// The pin does not exist on this board.
    Unavailable(P),
    /// The pin was already claimed by an earlier table.
    AlreadyOpen(P),
    /// The pin is part of a handle but has not been claimed.
    NotOpen(P),
    /// The handle has no edge-triggered inputs to listen on.
    NoEdgeInputs,
}

pub trait PinSubsystem {
    type Pin: Copy + Eq + Format + 'static;

    fn open(
        &mut self,
        table: &'static [PinConfig<Self::Pin>],
    ) -> Result<PinHandle<Self::Pin>, PinError<Self::Pin>>;

    /// Enables edge notifications for every input in `handle`.
    fn register_edge_listener(
        &mut self,
        handle: &PinHandle<Self::Pin>,
    ) -> Result<(), PinError<Self::Pin>>;

    fn input_level(&self, pin: Self::Pin) -> Level;

    fn output_level(&self, pin: Self::Pin) -> Level;

    fn set_output_level(&mut self, pin: Self::Pin, level: Level);
}

/// Asynchronous edge notifications from a [`PinSubsystem`].
#[allow(async_fn_in_trait)]
pub trait EdgeSource: PinSubsystem {
    /// Resolves once per qualifying edge with the pin that fired.
    async fn wait_for_edge(&mut self) -> Self::Pin;
}

#[macro_export]
macro_rules! declare_tests {
    {$subsystem:expr, $P:ty, $input:expr, $output:expr, $absent:expr, $(#[$meta:meta]),*, $($prelude:tt)*} => {
        #[cfg(test)]
        $(#[$meta])*
        mod tests {

            $($prelude)*

            use pin_interface::{Drive, Edge, Level, PinConfig, PinError, PinSubsystem, Pull};

            const INPUTS: &[PinConfig<$P>] = &[PinConfig::input($input, Pull::Up, Edge::Falling)];
            const OUTPUTS: &[PinConfig<$P>] = &[PinConfig::output($output, Level::High, Drive::Max)];
            const ABSENT: &[PinConfig<$P>] = &[PinConfig::output($absent, Level::Low, Drive::Low)];

            #[test]
            pub fn test_open_applies_initial_output_level() {
                let mut pins = $subsystem;
                pins.open(OUTPUTS).unwrap();
                assert_eq!(pins.output_level($output), Level::High);
            }

            #[test]
            pub fn test_open_pulled_up_input_idles_high() {
                let mut pins = $subsystem;
                pins.open(INPUTS).unwrap();
                assert_eq!(pins.input_level($input), Level::High);
            }

            #[test]
            pub fn test_open_twice_fails() {
                let mut pins = $subsystem;
                pins.open(OUTPUTS).unwrap();
                assert_eq!(pins.open(OUTPUTS), Err(PinError::AlreadyOpen($output)));
            }

            #[test]
            pub fn test_open_absent_pin_fails() {
                let mut pins = $subsystem;
                assert_eq!(pins.open(ABSENT), Err(PinError::Unavailable($absent)));
            }

            #[test]
            pub fn test_register_without_edge_inputs_fails() {
                let mut pins = $subsystem;
                let handle = pins.open(OUTPUTS).unwrap();
                assert_eq!(pins.register_edge_listener(&handle), Err(PinError::NoEdgeInputs));
            }

            #[test]
            pub fn test_register_edge_inputs() {
                let mut pins = $subsystem;
                let handle = pins.open(INPUTS).unwrap();
                assert_eq!(pins.register_edge_listener(&handle), Ok(()));
            }

            #[test]
            pub fn test_set_output_level_round_trips() {
                let mut pins = $subsystem;
                pins.open(OUTPUTS).unwrap();

                let complement = !pins.output_level($output);
                pins.set_output_level($output, complement);
                assert_eq!(pins.output_level($output), Level::Low);

                pins.set_output_level($output, !complement);
                assert_eq!(pins.output_level($output), Level::High);
            }
        }
    };
}
