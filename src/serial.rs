//! Sun keyboard serial link - 1200 baud 8N1 on UARTE0.
//!
//! The receive half feeds every byte into the shared bridge. The
//! transmit half resets the keyboard at boot and then forwards LED
//! commands produced by the USB request handler.

use defmt::{info, trace, warn};
use embassy_nrf::uarte::{self, Baudrate, Parity, Uarte, UarteRx, UarteTx};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{with_timeout, Duration, Timer};
use sun2usb::{config, sun, Error};

use crate::{LedSignal, ReadySignal, SharedBridge};

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

pub type KeyboardRx = UarteRx<'static, peripherals::UARTE0>;
pub type KeyboardTx = UarteTx<'static, peripherals::UARTE0>;

const _: () = assert!(config::SUN_BAUD == 1200);

/// Bring up the UART and split it into its two directions.
pub fn init(
    uarte: peripherals::UARTE0,
    rxd: peripherals::P0_08,
    txd: peripherals::P0_06,
) -> (KeyboardTx, KeyboardRx) {
    let mut uart_config = uarte::Config::default();
    uart_config.parity = Parity::EXCLUDED;
    uart_config.baudrate = Baudrate::BAUD1200;

    let uart = Uarte::new(uarte, Irqs, rxd, txd, uart_config);
    info!("Keyboard UART up at {} baud", config::SUN_BAUD);
    uart.split()
}

/// Receive loop: one byte at a time into the bridge.
pub async fn receive_task(
    mut rx: KeyboardRx,
    bridge: &'static SharedBridge,
    ready: &'static ReadySignal,
) -> ! {
    info!("Keyboard receive task started");

    loop {
        match receive_byte(&mut rx).await {
            Ok(byte) => {
                trace!("rx {=u8:#04x}", byte);
                if bridge.lock(|b| b.borrow_mut().ingest(byte)) {
                    ready.signal(());
                }
            }
            Err(e) => warn!("Keyboard receive failed: {}", e),
        }
    }
}

async fn receive_byte(rx: &mut KeyboardRx) -> Result<u8, Error> {
    let mut byte = [0u8; 1];
    rx.read(&mut byte).await?;
    Ok(byte[0])
}

/// Transmit loop: reset + layout query at boot, then LED commands.
pub async fn transmit_task(mut tx: KeyboardTx, commands: &'static LedSignal) -> ! {
    info!("Keyboard transmit task started");

    let reset = sun::reset_command();
    if let Err(e) = send(&mut tx, &reset).await {
        warn!("Keyboard reset failed: {}", e);
    }
    Timer::after(Duration::from_millis(config::KEYBOARD_RESET_SETTLE_MS)).await;

    let layout = sun::layout_command();
    if let Err(e) = send(&mut tx, &layout).await {
        warn!("Keyboard layout request failed: {}", e);
    }

    loop {
        // Signal keeps only the newest command; older LED states are stale.
        let command = commands.wait().await;
        if let Err(e) = send(&mut tx, &command).await {
            warn!("Keyboard LED command failed: {}", e);
        }
    }
}

/// Write a command, bounded so a wedged UART cannot stall the task.
async fn send(tx: &mut KeyboardTx, bytes: &[u8]) -> Result<(), Error> {
    let timeout = Duration::from_millis(config::SERIAL_WRITE_TIMEOUT_MS);
    with_timeout(timeout, tx.write(bytes)).await??;
    Ok(())
}
