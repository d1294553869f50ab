//! SSD1306 OLED display driver
//!
//! Drives a 128x64 SSD1306 panel over async I2C in horizontal addressing
//! mode. The driver holds no framebuffer of its own: callers render into an
//! [`altimeter_core::display::Framebuffer`] and hand it over through
//! [`DisplayTransport::present`].

use altimeter_core::display::{RenderRegion, PANEL_HEIGHT, PANEL_WIDTH};
use altimeter_core::traits::DisplayTransport;

/// Default SSD1306 I2C address
pub const SSD1306_ADDR: u8 = 0x3C;

/// Control byte: a single command follows
const CONTROL_COMMAND: u8 = 0x80;

/// Control byte: display data follows until the end of the transfer
const CONTROL_DATA: u8 = 0x40;

/// Data bytes sent per I2C transfer
const DATA_CHUNK: usize = PANEL_WIDTH;

/// SSD1306 commands
mod cmd {
    pub const SET_MEM_MODE: u8 = 0x20;
    pub const SET_COL_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_SCROLL: u8 = 0x2E;
    pub const SET_DISP_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_SEG_REMAP: u8 = 0xA0;
    pub const SET_ENTIRE_ON: u8 = 0xA4;
    pub const SET_NORM_DISP: u8 = 0xA6;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DISP: u8 = 0xAE;
    pub const SET_COM_OUT_DIR: u8 = 0xC0;
    pub const SET_DISP_OFFSET: u8 = 0xD3;
    pub const SET_DISP_CLK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PIN_CFG: u8 = 0xDA;
    pub const SET_VCOM_DESEL: u8 = 0xDB;
}

/// SSD1306 driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ssd1306Error<E> {
    /// I2C transfer failed
    Bus(E),
    /// Buffer is shorter than the region it should fill
    RegionMismatch,
}

impl<E> From<E> for Ssd1306Error<E> {
    fn from(e: E) -> Self {
        Ssd1306Error::Bus(e)
    }
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Ssd1306<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Create a new SSD1306 driver
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Initialize the panel and switch it on
    pub async fn init(&mut self, contrast: u8) -> Result<(), Ssd1306Error<I2C::Error>> {
        let init_cmds: &[u8] = &[
            cmd::SET_DISP, // Display off
            cmd::SET_MEM_MODE,
            0x00, // Horizontal addressing
            cmd::SET_DISP_START_LINE,
            cmd::SET_SEG_REMAP | 0x01, // Column 127 mapped to SEG0
            cmd::SET_MUX_RATIO,
            (PANEL_HEIGHT - 1) as u8,
            cmd::SET_COM_OUT_DIR | 0x08, // Scan from COM[N-1] to COM0
            cmd::SET_DISP_OFFSET,
            0x00,
            cmd::SET_COM_PIN_CFG,
            0x12, // 128x64
            cmd::SET_DISP_CLK_DIV,
            0x80,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DESEL,
            0x30,
            cmd::SET_CONTRAST,
            contrast,
            cmd::SET_ENTIRE_ON, // Follow RAM content
            cmd::SET_NORM_DISP,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_SCROLL,      // Scrolling off
            cmd::SET_DISP | 0x01, // Display on
        ];

        self.write_command_list(init_cmds).await
    }

    /// Send one command byte
    pub async fn write_command(&mut self, command: u8) -> Result<(), Ssd1306Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, command])
            .await?;
        Ok(())
    }

    /// Send command bytes in order, one transfer each
    pub async fn write_command_list(&mut self, commands: &[u8]) -> Result<(), Ssd1306Error<I2C::Error>> {
        for &command in commands {
            self.write_command(command).await?;
        }
        Ok(())
    }

    /// Stream display data into the current address window
    ///
    /// Sent in transfers of up to one page width; the panel's address
    /// pointer carries on from one transfer to the next. A failed transfer
    /// stops the stream, leaving earlier transfers on the panel.
    pub async fn write_buffer(&mut self, bytes: &[u8]) -> Result<(), Ssd1306Error<I2C::Error>> {
        let mut frame = [0u8; DATA_CHUNK + 1];
        frame[0] = CONTROL_DATA;

        for chunk in bytes.chunks(DATA_CHUNK) {
            frame[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.address, &frame[..=chunk.len()]).await?;
        }
        Ok(())
    }

    /// Set display contrast (0-255)
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), Ssd1306Error<I2C::Error>> {
        self.write_command_list(&[cmd::SET_CONTRAST, contrast]).await
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> DisplayTransport for Ssd1306<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    type Error = Ssd1306Error<I2C::Error>;

    /// Set the address window to `region` and stream the first
    /// `region.byte_length()` bytes of `buffer`
    ///
    /// Not atomic: the window commands and each page of data are separate
    /// transfers. A bus error part way through leaves the panel with the
    /// pages sent so far; the next full present repaints it.
    async fn present(&mut self, buffer: &[u8], region: &RenderRegion) -> Result<(), Self::Error> {
        let data = buffer
            .get(..region.byte_length())
            .ok_or(Ssd1306Error::RegionMismatch)?;

        self.write_command_list(&[
            cmd::SET_COL_ADDR,
            region.start_column(),
            region.end_column(),
            cmd::SET_PAGE_ADDR,
            region.start_page(),
            region.end_page(),
        ])
        .await?;

        self.write_buffer(data).await
    }
}
