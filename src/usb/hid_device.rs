//! USB HID composite device - keyboard + consumer control.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral, answers the HID class requests (GET/SET_REPORT,
//! GET/SET_IDLE) and runs the report poller.

use defmt::{debug, info, warn};
use embassy_futures::select::select;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::wdt::WatchdogHandle;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_time::{with_timeout, Duration, Ticker, Timer};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;
use sun2usb::hid::consumer::{CONSUMER_REPORT_DESCRIPTOR, CONSUMER_REPORT_ID};
use sun2usb::hid::keyboard::KEYBOARD_REPORT_DESCRIPTOR;
use sun2usb::hid::ReportKind;
use sun2usb::led::LedBridge;
use sun2usb::{config, idle, Error};

use crate::{LedSignal, ReadySignal, SharedBridge};

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

/// HID writer for either interface; both fit in one 8-byte packet.
pub type ReportWriter = HidWriter<'static, UsbDriver, 8>;

static KB_STATE: StaticCell<State> = StaticCell::new();
static CONSUMER_STATE: StaticCell<State> = StaticCell::new();
static KB_HANDLER: StaticCell<KeyboardRequestHandler> = StaticCell::new();
static CONSUMER_HANDLER: StaticCell<ConsumerRequestHandler> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Class requests on the keyboard interface.
///
/// Owns the LED bridge: the host's LED writes arrive here and only
/// changes are passed on to the keyboard transmit task.
struct KeyboardRequestHandler {
    bridge: &'static SharedBridge,
    leds: LedBridge,
    led_commands: &'static LedSignal,
}

impl RequestHandler for KeyboardRequestHandler {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        match id {
            ReportId::In(_) => {
                let report = self.bridge.lock(|b| b.borrow().keyboard_report());
                Some(report.serialize(buf))
            }
            _ => None,
        }
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        match (id, data) {
            (ReportId::Out(_), &[leds]) => {
                if let Some(command) = self.leds.update(leds) {
                    self.led_commands.signal(command);
                }
            }
            _ => debug!("Ignoring SET_REPORT of {} bytes", data.len()),
        }
        OutResponse::Accepted
    }

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        let rate = self.bridge.lock(|b| b.borrow().idle_rate());
        Some(idle::ms_from_rate(rate))
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, duration_ms: u32) {
        let rate = idle::rate_from_ms(duration_ms);
        self.bridge.lock(|b| b.borrow_mut().set_idle_rate(rate));
    }
}

/// Class requests on the consumer interface.
struct ConsumerRequestHandler {
    bridge: &'static SharedBridge,
}

impl RequestHandler for ConsumerRequestHandler {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        match id {
            ReportId::In(CONSUMER_REPORT_ID) => {
                let report = self.bridge.lock(|b| b.borrow().consumer_report());
                Some(report.serialize(buf))
            }
            _ => None,
        }
    }
}

/// Build result containing the USB device runner and the two HID writers.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: ReportWriter,
    pub consumer_writer: ReportWriter,
}

/// Initialise the USB stack and create the composite HID device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(
    usbd: peripherals::USBD,
    bridge: &'static SharedBridge,
    led_commands: &'static LedSignal,
) -> UsbHidDevice {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    // Build the USB device.
    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let kb_state = KB_STATE.init(State::new());
    let kb_handler = KB_HANDLER.init(KeyboardRequestHandler {
        bridge,
        leds: LedBridge::new(),
        led_commands,
    });
    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: Some(kb_handler),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let keyboard_writer = HidWriter::new(&mut builder, kb_state, kb_config);

    let consumer_state = CONSUMER_STATE.init(State::new());
    let consumer_handler = CONSUMER_HANDLER.init(ConsumerRequestHandler { bridge });
    let consumer_config = HidConfig {
        report_descriptor: CONSUMER_REPORT_DESCRIPTOR,
        request_handler: Some(consumer_handler),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let consumer_writer = HidWriter::new(&mut builder, consumer_state, consumer_config);

    let device = builder.build();

    info!("USB HID composite device initialised (keyboard + consumer)");

    UsbHidDevice {
        device,
        keyboard_writer,
        consumer_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and control requests.
/// It runs forever (or until the USB cable is disconnected).
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Idle/repeat timer - ticks the bridge every 4 ms and wakes the poller
/// when the host's idle period has elapsed.
pub async fn idle_ticker(bridge: &'static SharedBridge, ready: &'static ReadySignal) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(config::IDLE_TICK_MS));
    loop {
        ticker.next().await;
        if bridge.lock(|b| b.borrow_mut().tick()) {
            ready.signal(());
        }
    }
}

/// Report poller - the only place reports leave the firmware.
///
/// Each iteration pets the watchdog, waits for new data (or the pet
/// interval), then hands every pending report to its HID endpoint.
pub async fn report_poller(
    mut keyboard: ReportWriter,
    mut consumer: ReportWriter,
    bridge: &'static SharedBridge,
    ready: &'static ReadySignal,
    mut watchdog: WatchdogHandle,
) -> ! {
    info!("Report poller started - waiting for key events");

    let mut buf = [0u8; 8];

    loop {
        watchdog.pet();
        select(
            ready.wait(),
            Timer::after(Duration::from_millis(config::WATCHDOG_PET_MS)),
        )
        .await;

        while let Some(report) = bridge.lock(|b| b.borrow_mut().next_report()) {
            let kind = report.kind();
            let n = report.serialize(&mut buf);
            let writer = match kind {
                ReportKind::Keyboard => &mut keyboard,
                ReportKind::Consumer => &mut consumer,
            };

            match transmit(writer, &buf[..n]).await {
                Ok(()) => bridge.lock(|b| b.borrow_mut().report_sent(kind)),
                Err(e) => {
                    // Host not polling (suspended, not configured); keep
                    // the report and try again next cycle.
                    warn!("USB {} report not sent: {}", kind, e);
                    bridge.lock(|b| b.borrow_mut().report_dropped(kind));
                    break;
                }
            }
            watchdog.pet();
        }
    }
}

/// Write one report, giving up if the endpoint does not accept it in time.
async fn transmit(writer: &mut ReportWriter, data: &[u8]) -> Result<(), Error> {
    let timeout = Duration::from_millis(config::TRANSPORT_READY_TIMEOUT_MS);
    with_timeout(timeout, writer.write(data)).await??;
    Ok(())
}
