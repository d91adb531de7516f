//! Display panel: where a finished framebuffer goes.
//!
//! The render task only sees the `Panel` trait. On target it is the ST7789
//! over SPIM with a PWM backlight.

use crate::config::MAX_BRIGHTNESS;
use crate::error::Error;
use crate::ui::display::Framebuffer;

#[allow(async_fn_in_trait)]
pub trait Panel {
    /// Push a complete frame to the glass.
    async fn commit(&mut self, fb: &Framebuffer) -> Result<(), Error>;

    /// Panel sleep in/out. The backlight follows.
    async fn set_display_on(&mut self, on: bool) -> Result<(), Error>;

    /// Backlight level in percent, clamped to `MAX_BRIGHTNESS`.
    fn set_brightness(&mut self, percent: u8);
}

/// PWM compare value for a brightness percentage.
pub fn backlight_duty(percent: u8, max_duty: u16) -> u16 {
    let percent = percent.min(MAX_BRIGHTNESS) as u32;
    (max_duty as u32 * percent / MAX_BRIGHTNESS as u32) as u16
}

#[cfg(feature = "embedded")]
mod st7789 {
    use defmt::{info, warn};
    use embassy_nrf::gpio::Output;
    use embassy_nrf::peripherals::{PWM0, SPI3};
    use embassy_nrf::pwm::SimplePwm;
    use embassy_nrf::spim::Spim;
    use embassy_time::Timer;

    use super::{backlight_duty, Panel};
    use crate::config::{DISPLAY_WAKE_DELAY_MS, SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::error::Error;
    use crate::ui::display::Framebuffer;

    // ST7789 commands
    const SWRESET: u8 = 0x01;
    const SLPIN: u8 = 0x10;
    const SLPOUT: u8 = 0x11;
    const NORON: u8 = 0x13;
    const INVON: u8 = 0x21;
    const DISPOFF: u8 = 0x28;
    const DISPON: u8 = 0x29;
    const CASET: u8 = 0x2A;
    const RASET: u8 = 0x2B;
    const RAMWR: u8 = 0x2C;
    const MADCTL: u8 = 0x36;
    const COLMOD: u8 = 0x3A;

    /// EasyDMA transfer limit of the nRF52840 SPIM.
    const DMA_CHUNK: usize = 0xFFFF;

    const PWM_MAX_DUTY: u16 = 1000;

    pub struct St7789Panel<'d> {
        spi: Spim<'d, SPI3>,
        dc: Output<'d>,
        cs: Output<'d>,
        rst: Output<'d>,
        backlight: SimplePwm<'d, PWM0>,
        brightness: u8,
        on: bool,
    }

    impl<'d> St7789Panel<'d> {
        pub fn new(
            spi: Spim<'d, SPI3>,
            dc: Output<'d>,
            cs: Output<'d>,
            rst: Output<'d>,
            mut backlight: SimplePwm<'d, PWM0>,
        ) -> Self {
            backlight.set_max_duty(PWM_MAX_DUTY);
            Self {
                spi,
                dc,
                cs,
                rst,
                backlight,
                brightness: 0,
                on: false,
            }
        }

        /// Hardware reset and register setup. Leaves the backlight dark.
        pub async fn init(&mut self) -> Result<(), Error> {
            self.apply_backlight(0);

            self.rst.set_low();
            Timer::after_millis(10).await;
            self.rst.set_high();
            Timer::after_millis(120).await;

            self.write_command(SWRESET).await?;
            Timer::after_millis(150).await;

            self.write_command(SLPOUT).await?;
            Timer::after_millis(10).await;

            // RGB565
            self.write_command(COLMOD).await?;
            self.write_data(&[0x55]).await?;

            // Portrait, RGB order
            self.write_command(MADCTL).await?;
            self.write_data(&[0x00]).await?;

            self.write_command(INVON).await?;
            Timer::after_millis(10).await;

            self.write_command(NORON).await?;
            Timer::after_millis(10).await;

            self.write_command(DISPON).await?;
            Timer::after_millis(10).await;

            self.set_window(0, 0, SCREEN_WIDTH as u16, SCREEN_HEIGHT as u16)
                .await?;
            self.on = true;

            info!("Display: ST7789 {}x{} ready", SCREEN_WIDTH, SCREEN_HEIGHT);
            Ok(())
        }

        async fn write_command(&mut self, cmd: u8) -> Result<(), Error> {
            self.cs.set_low();
            self.dc.set_low();
            let res = self.spi.write(&[cmd]).await;
            self.cs.set_high();
            res.map_err(|e| {
                warn!("Display: command {=u8:#x} failed: {:?}", cmd, e);
                Error::Display
            })
        }

        async fn write_data(&mut self, data: &[u8]) -> Result<(), Error> {
            self.cs.set_low();
            self.dc.set_high();
            let res = self.spi.write(data).await;
            self.cs.set_high();
            res.map_err(|e| {
                warn!("Display: data write failed: {:?}", e);
                Error::Display
            })
        }

        async fn set_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), Error> {
            let x1 = x + w - 1;
            let y1 = y + h - 1;

            self.write_command(CASET).await?;
            self.write_data(&[(x >> 8) as u8, x as u8, (x1 >> 8) as u8, x1 as u8])
                .await?;

            self.write_command(RASET).await?;
            self.write_data(&[(y >> 8) as u8, y as u8, (y1 >> 8) as u8, y1 as u8])
                .await
        }

        fn apply_backlight(&mut self, percent: u8) {
            self.backlight
                .set_duty(0, backlight_duty(percent, PWM_MAX_DUTY));
        }
    }

    impl Panel for St7789Panel<'_> {
        async fn commit(&mut self, fb: &Framebuffer) -> Result<(), Error> {
            if !self.on {
                return Ok(());
            }
            self.cs.set_low();
            self.dc.set_low();
            let mut res = self.spi.write(&[RAMWR]).await;
            self.dc.set_high();
            for chunk in fb.as_bytes().chunks(DMA_CHUNK) {
                if res.is_err() {
                    break;
                }
                res = self.spi.write(chunk).await;
            }
            self.cs.set_high();
            res.map_err(|e| {
                warn!("Display: frame transfer failed: {:?}", e);
                Error::Display
            })
        }

        async fn set_display_on(&mut self, on: bool) -> Result<(), Error> {
            if on == self.on {
                return Ok(());
            }
            if on {
                self.write_command(SLPOUT).await?;
                Timer::after_millis(10).await;
                self.write_command(DISPON).await?;
                Timer::after_millis(DISPLAY_WAKE_DELAY_MS).await;
                self.on = true;
                self.apply_backlight(self.brightness);
                info!("Display: on");
            } else {
                self.apply_backlight(0);
                self.on = false;
                self.write_command(DISPOFF).await?;
                self.write_command(SLPIN).await?;
                info!("Display: off");
            }
            Ok(())
        }

        fn set_brightness(&mut self, percent: u8) {
            self.brightness = percent;
            if self.on {
                self.apply_backlight(percent);
            }
        }
    }
}

#[cfg(feature = "embedded")]
pub use st7789::St7789Panel;
