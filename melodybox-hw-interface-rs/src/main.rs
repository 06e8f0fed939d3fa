//! melodybox-hw-interface
//!
//! Melody box firmware for the Raspberry Pi Pico 2. Wires the core state
//! machine and the LCD driver to the board:
//!
//! 1. The input task polls the five buttons every 20 ms and drives the menu,
//!    the player controls and the volume.
//! 2. The playback task walks the selected melody and drives the buzzer PWM.
//! 3. The blink task flashes "Paused" while a melody is paused.
//! 4. The LCD task draws every frame the other three post to the display
//!    channel.
//!
//! The volume survives power cycles in the last flash sector.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::flash::{self, Blocking, Flash};
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{FLASH, I2C0};
use embassy_rp::pwm::{self, Pwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Delay, Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use melodybox::config::{MAX_TONE_HZ, SPLASH_MS};
use melodybox::render::{self, DisplayChannel};
use melodybox::{
    AppState, AudioOutput, BlinkIndicator, Button, ButtonPad, FlashStore, FrameSink,
    InputDispatcher, OutputError, PlaybackEngine,
};
use melodybox_lcd_rs::{frame_flush_task, CharLcd, LcdConfig};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// Wire the I2C0 peripheral interrupt to Embassy's async handler.
bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Board constants
// ---------------------------------------------------------------------------

/// Pico 2 QSPI flash size.
const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Settings live in the last erase sector, outside the image (see memory.x).
const SETTINGS_SIZE: u32 = flash::ERASE_SIZE as u32;
const SETTINGS_OFFSET: u32 = FLASH_SIZE as u32 - SETTINGS_SIZE;
const _: () = assert!(SETTINGS_OFFSET % SETTINGS_SIZE == 0);

/// PWM clock divider for the buzzer. At 150 MHz this gives a 2.34 MHz
/// counter, so tones from ~36 Hz up to 20 kHz fit in the 16-bit `top`.
const BUZZER_DIVIDER: u8 = 64;

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Shared application state: written through the ports handed out by
/// `AppState::split`, read by every task.
static STATE: AppState = AppState::new();

/// Frames and backlight requests for the LCD task.
static DISPLAY: DisplayChannel = DisplayChannel::new();

/// Buzzer shared by the input task (silence on pause/stop) and the playback
/// task.
static BUZZER: StaticCell<Buzzer> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type LcdI2c = I2c<'static, I2C0, i2c::Async>;
type Settings = FlashStore<Flash<'static, FLASH, Blocking, FLASH_SIZE>>;
type Dispatcher = InputDispatcher<'static, Buzzer, Settings, DisplayChannel>;

// ---------------------------------------------------------------------------
// Buzzer
// ---------------------------------------------------------------------------

struct BuzzerPwm {
    pwm: Pwm<'static>,
    config: pwm::Config,
    level: u16,
}

impl BuzzerPwm {
    /// Compare value giving `level / 65536` duty at the current `top`.
    fn compare(&self) -> u16 {
        let period = u32::from(self.config.top) + 1;
        (period * u32::from(self.level) / 0x1_0000) as u16
    }

    fn apply(&mut self) {
        self.pwm.set_config(&self.config);
    }
}

/// Passive piezo on a PWM channel: `top` sets the pitch, the compare value
/// sets the duty and with it the loudness.
struct Buzzer {
    inner: Mutex<CriticalSectionRawMutex, RefCell<BuzzerPwm>>,
}

impl Buzzer {
    fn new(mut pwm: Pwm<'static>) -> Self {
        let mut config = pwm::Config::default();
        config.divider = BUZZER_DIVIDER.into();
        config.compare_a = 0;
        pwm.set_config(&config);
        Self {
            inner: Mutex::new(RefCell::new(BuzzerPwm {
                pwm,
                config,
                level: 0,
            })),
        }
    }
}

impl AudioOutput for Buzzer {
    fn set_frequency(&self, hz: u32) -> Result<(), OutputError> {
        if hz == 0 || hz > MAX_TONE_HZ {
            return Err(OutputError::FrequencyRejected);
        }
        let counter_hz = embassy_rp::clocks::clk_sys_freq() / u32::from(BUZZER_DIVIDER);
        let top = (counter_hz / hz)
            .checked_sub(1)
            .and_then(|t| u16::try_from(t).ok())
            .ok_or(OutputError::FrequencyRejected)?;

        self.inner.lock(|cell| {
            let mut buzzer = cell.borrow_mut();
            buzzer.config.top = top;
            buzzer.config.compare_a = buzzer.compare();
            buzzer.apply();
        });
        Ok(())
    }

    fn set_intensity(&self, level: u16) {
        self.inner.lock(|cell| {
            let mut buzzer = cell.borrow_mut();
            buzzer.level = level;
            buzzer.config.compare_a = buzzer.compare();
            buzzer.apply();
        });
    }

    fn silence(&self) {
        self.inner.lock(|cell| {
            let mut buzzer = cell.borrow_mut();
            buzzer.config.compare_a = 0;
            buzzer.apply();
        });
    }
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

/// The five push buttons, wired to ground with internal pull-ups.
struct GpioPad {
    up: Input<'static>,
    down: Input<'static>,
    left: Input<'static>,
    right: Input<'static>,
    enter: Input<'static>,
}

impl ButtonPad for GpioPad {
    fn is_pressed(&self, button: Button) -> bool {
        let pin = match button {
            Button::Up => &self.up,
            Button::Down => &self.down,
            Button::Left => &self.left,
            Button::Right => &self.right,
            Button::Enter => &self.enter,
        };
        pin.is_low()
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Thin wrapper that monomorphises the generic `frame_flush_task` so it can
/// be spawned as a concrete Embassy task.
#[embassy_executor::task]
async fn lcd_task(lcd: CharLcd<LcdI2c, Delay>, channel: &'static DisplayChannel) {
    frame_flush_task(lcd, channel).await;
}

#[embassy_executor::task]
async fn input_task(dispatcher: Dispatcher, pad: GpioPad) {
    info!("Input task started");
    dispatcher.run(pad).await
}

#[embassy_executor::task]
async fn playback_task(engine: PlaybackEngine<'static, Buzzer, DisplayChannel>) {
    info!("Playback task started");
    engine.run().await
}

#[embassy_executor::task]
async fn blink_task(blink: BlinkIndicator<'static, DisplayChannel>) {
    blink.run().await
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("melodybox-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // I2C_SDA → GP20  (p.PIN_20)  LCD backpack
    // I2C_SCL → GP21  (p.PIN_21)
    // BTN_DN  → GP12  (p.PIN_12)  active-low, pull-up enabled
    // BTN_UP  → GP13  (p.PIN_13)
    // BTN_L   → GP14  (p.PIN_14)
    // BTN_R   → GP15  (p.PIN_15)
    // BTN_OK  → GP16  (p.PIN_16)
    // BUZZER  → GP18  (p.PIN_18)  PWM slice 1, channel A
    // ———————————————————————————————————————————————————————————————————————

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );
    let lcd = CharLcd::new(i2c, Delay, LcdConfig::default());

    let pad = GpioPad {
        up: Input::new(p.PIN_13, Pull::Up),
        down: Input::new(p.PIN_12, Pull::Up),
        left: Input::new(p.PIN_14, Pull::Up),
        right: Input::new(p.PIN_15, Pull::Up),
        enter: Input::new(p.PIN_16, Pull::Up),
    };

    let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_18, pwm::Config::default());
    let buzzer: &'static Buzzer = BUZZER.init(Buzzer::new(pwm));

    let flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
    let settings = FlashStore::new(flash, SETTINGS_OFFSET, SETTINGS_SIZE).unwrap_or_else(|e| {
        defmt::panic!(
            "Settings region {=u32:#x}+{=u32:#x} unusable: {}",
            SETTINGS_OFFSET,
            SETTINGS_SIZE,
            e
        )
    });

    // —— Shared state ———————————————————————————————————————————————————————

    let ports = STATE.split().unwrap();

    let mut dispatcher = InputDispatcher::new(ports.input, buzzer, settings, &DISPLAY);
    let volume = dispatcher.restore_volume();
    info!("Volume {}", volume.level());

    // —— Spawn tasks ————————————————————————————————————————————————————————

    DISPLAY.show(render::splash_frame());
    spawner.spawn(lcd_task(lcd, &DISPLAY)).unwrap();
    spawner
        .spawn(playback_task(PlaybackEngine::new(ports.playback, buzzer, &DISPLAY)))
        .unwrap();
    spawner
        .spawn(blink_task(BlinkIndicator::new(ports.blink, &DISPLAY)))
        .unwrap();

    Timer::after(Duration::from_millis(SPLASH_MS)).await;
    dispatcher.redraw();
    spawner.spawn(input_task(dispatcher, pad)).unwrap();

    info!("All tasks spawned");
}
