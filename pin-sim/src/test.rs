use defmt::Format;
use pin_interface::{Drive, Edge, Level, PinConfig, PinError, PinSubsystem, Pull};
use pretty_assertions::assert_eq;

use crate::SimPins;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPin {
    Switch,
    Led,
    Missing,
}

const BOARD: [TestPin; 2] = [TestPin::Switch, TestPin::Led];

static SWITCH_TABLE: [PinConfig<TestPin>; 1] =
    [PinConfig::input(TestPin::Switch, Pull::Up, Edge::Falling)];

static MIXED_TABLE: [PinConfig<TestPin>; 2] = [
    PinConfig::output(TestPin::Led, Level::Low, Drive::Max),
    PinConfig::output(TestPin::Missing, Level::Low, Drive::Max),
];

static LED_TABLE: [PinConfig<TestPin>; 1] =
    [PinConfig::output(TestPin::Led, Level::Low, Drive::Max)];

static REPEATED_TABLE: [PinConfig<TestPin>; 2] = [
    PinConfig::output(TestPin::Led, Level::Low, Drive::Max),
    PinConfig::output(TestPin::Led, Level::High, Drive::Max),
];

pin_interface::declare_tests! {
    crate::SimPins::<TestPin, 4>::new(&BOARD),
    TestPin,
    TestPin::Switch,
    TestPin::Led,
    TestPin::Missing,
    ,
    use super::{BOARD, TestPin};
}

#[test]
fn press_dispatches_only_once_listening() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    let handle = pins.open(&SWITCH_TABLE).unwrap();

    assert_eq!(pins.press(TestPin::Switch), None);
    assert_eq!(pins.release(TestPin::Switch), None);

    pins.register_edge_listener(&handle).unwrap();
    assert!(pins.is_listening(TestPin::Switch));

    assert_eq!(pins.press(TestPin::Switch), Some(TestPin::Switch));
    assert_eq!(pins.input_level(TestPin::Switch), Level::Low);
}

#[test]
fn release_does_not_fire_falling_edge() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    let handle = pins.open(&SWITCH_TABLE).unwrap();
    pins.register_edge_listener(&handle).unwrap();

    assert_eq!(pins.press(TestPin::Switch), Some(TestPin::Switch));
    assert_eq!(pins.release(TestPin::Switch), None);
    assert_eq!(pins.input_level(TestPin::Switch), Level::High);
}

#[test]
fn pressing_an_already_low_input_does_not_fire() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    let handle = pins.open(&SWITCH_TABLE).unwrap();
    pins.register_edge_listener(&handle).unwrap();

    assert_eq!(pins.press(TestPin::Switch), Some(TestPin::Switch));
    assert_eq!(pins.press(TestPin::Switch), None);
}

#[test]
fn failed_open_claims_nothing() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);

    assert_eq!(
        pins.open(&MIXED_TABLE),
        Err(PinError::Unavailable(TestPin::Missing))
    );
    assert!(pins.open(&LED_TABLE).is_ok());
}

#[test]
fn repeated_pin_in_one_table_fails() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);

    assert_eq!(
        pins.open(&REPEATED_TABLE),
        Err(PinError::AlreadyOpen(TestPin::Led))
    );
}

#[test]
fn register_unopened_handle_fails() {
    let mut opened = SimPins::<TestPin, 4>::new(&BOARD);
    let handle = opened.open(&SWITCH_TABLE).unwrap();

    let mut fresh = SimPins::<TestPin, 4>::new(&BOARD);
    assert_eq!(
        fresh.register_edge_listener(&handle),
        Err(PinError::NotOpen(TestPin::Switch))
    );
}

#[test]
fn write_count_tracks_output_writes() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    pins.open(&LED_TABLE).unwrap();
    assert_eq!(pins.write_count(), 0);

    pins.set_output_level(TestPin::Led, Level::High);
    pins.set_output_level(TestPin::Led, Level::High);
    assert_eq!(pins.write_count(), 2);
}

#[test]
#[should_panic]
fn reading_an_unopened_input_panics() {
    let pins = SimPins::<TestPin, 4>::new(&BOARD);
    pins.input_level(TestPin::Switch);
}

#[test]
#[should_panic]
fn writing_an_input_panics() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    pins.open(&SWITCH_TABLE).unwrap();
    pins.set_output_level(TestPin::Switch, Level::High);
}

#[test]
#[should_panic(expected = "is not an open input")]
fn pressing_an_unopened_switch_panics() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    pins.press(TestPin::Switch);
}

#[test]
#[should_panic(expected = "is not an open input")]
fn driving_an_output_panics() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    pins.open(&LED_TABLE).unwrap();
    pins.drive(TestPin::Led, Level::Low);
}

#[test]
fn drive_updates_the_level_it_reads_back() {
    let mut pins = SimPins::<TestPin, 4>::new(&BOARD);
    pins.open(&SWITCH_TABLE).unwrap();

    pins.press(TestPin::Switch);
    assert_eq!(pins.input_level(TestPin::Switch), Level::Low);
    pins.release(TestPin::Switch);
    assert_eq!(pins.input_level(TestPin::Switch), Level::High);
}
