//! sun2usb - Sun serial keyboard to USB HID adapter for the nRF52840.
//!
//! Task layout:
//!
//! - `usb_task`: USB enumeration and control requests (GET/SET_REPORT,
//!   GET/SET_IDLE, LED writes)
//! - `keyboard_rx_task`: keyboard bytes into the shared bridge
//! - `keyboard_tx_task`: reset/layout at boot, then LED commands
//! - `idle_task`: 4 ms idle-rate ticker
//! - main: the report poller, which also services the watchdog

#![no_std]
#![no_main]

mod serial;
mod usb;

use core::cell::RefCell;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::config::{Config as NrfConfig, HfclkSource};
use embassy_nrf::wdt::{self, HaltConfig, Watchdog};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_usb::UsbDevice;
use sun2usb::{config, Bridge};
use {defmt_rtt as _, panic_probe as _};

use crate::serial::{KeyboardRx, KeyboardTx};
use crate::usb::hid_device::{self, UsbDriver};

/// The bridge state shared by every task.
pub type SharedBridge = Mutex<CriticalSectionRawMutex, RefCell<Bridge>>;
/// Wakes the poller when a report is waiting.
pub type ReadySignal = Signal<CriticalSectionRawMutex, ()>;
/// Latest LED command for the keyboard.
pub type LedSignal = Signal<CriticalSectionRawMutex, [u8; 2]>;

static BRIDGE: SharedBridge =
    Mutex::new(RefCell::new(Bridge::new(config::CONSUMER_CONTROL_ENABLED)));
static REPORT_READY: ReadySignal = Signal::new();
static LED_COMMAND: LedSignal = Signal::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("sun2usb starting");

    // USB needs the crystal oscillator.
    let mut nrf_config = NrfConfig::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    let mut wdt_config = wdt::Config::default();
    wdt_config.timeout_ticks = 32768 * config::WATCHDOG_TIMEOUT_SECS;
    wdt_config.action_during_debug_halt = HaltConfig::PAUSE;
    let (_wdt, [watchdog]) = match Watchdog::try_new(p.WDT, wdt_config) {
        Ok(x) => x,
        Err(_) => {
            // Already running from before a soft reset with another
            // configuration; let it expire.
            warn!("Watchdog already running, waiting for reset");
            loop {
                cortex_m::asm::wfe();
            }
        }
    };

    let (tx, rx) = serial::init(p.UARTE0, p.P0_08, p.P0_06);
    let usb = hid_device::init(p.USBD, &BRIDGE, &LED_COMMAND);

    unwrap!(spawner.spawn(usb_task(usb.device)));
    unwrap!(spawner.spawn(keyboard_rx_task(rx)));
    unwrap!(spawner.spawn(keyboard_tx_task(tx)));
    unwrap!(spawner.spawn(idle_task()));

    hid_device::report_poller(
        usb.keyboard_writer,
        usb.consumer_writer,
        &BRIDGE,
        &REPORT_READY,
        watchdog,
    )
    .await
}

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn keyboard_rx_task(rx: KeyboardRx) -> ! {
    serial::receive_task(rx, &BRIDGE, &REPORT_READY).await
}

#[embassy_executor::task]
async fn keyboard_tx_task(tx: KeyboardTx) -> ! {
    serial::transmit_task(tx, &LED_COMMAND).await
}

#[embassy_executor::task]
async fn idle_task() -> ! {
    hid_device::idle_ticker(&BRIDGE, &REPORT_READY).await
}
