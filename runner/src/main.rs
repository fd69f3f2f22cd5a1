#![no_std]
#![no_main]

mod hardware;
mod status_task;
mod toggle_task;

use defmt::{info, unwrap};
use embassy_executor::Executor;
use pin_interface::PinSubsystem;
use static_cell::StaticCell;
use toggle::PinMapping;

use defmt_rtt as _;
use panic_probe as _;

use crate::hardware::{Hardware, LED_TABLE, ROUTES, SWITCH_TABLE};

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    let Hardware { mut pins } = Hardware::get();

    let leds = match pins.open(&LED_TABLE) {
        Ok(handle) => handle,
        Err(err) => defmt::panic!("Error initializing board LED pins: {}", err),
    };

    let switches = match pins.open(&SWITCH_TABLE) {
        Ok(handle) => handle,
        Err(err) => defmt::panic!("Error initializing DIO switch pins: {}", err),
    };

    if let Err(err) = pins.register_edge_listener(&switches) {
        defmt::panic!("Error registering DIO switch pin edge listener: {}", err);
    }

    let mapping = PinMapping::new(ROUTES);
    if let Err(err) = mapping.validate(&switches, &leds) {
        defmt::panic!("Error routing switches to LEDs: {}", err);
    }

    info!("Setting up executor");
    let executor = EXECUTOR.init(Executor::new());

    executor.run(|spawner| {
        info!("Spawning toggle task");
        spawner.spawn(unwrap!(toggle_task::create_task(pins, mapping)));

        info!("Spawning status task");
        spawner.spawn(unwrap!(status_task::status_task()));
    })
}
