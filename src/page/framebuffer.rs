//! Software framebuffer used to render simulated pages into screenshots.
//!
//! Pages are drawn as a browser viewport would roughly show them: a coloured
//! title bar, then one 8x8 glyph row per text line on a white background.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageBuffer, RgbImage};
use std::io::Cursor;

use super::types::{PageError, PageResult};

pub type Color = [u8; 3];

/// Glyph size in pixels
const GLYPH: u32 = 8;

/// Vertical distance between text lines
const LINE_HEIGHT: u32 = 12;

/// Left/top padding of page content
const PADDING: u32 = 8;

const PAGE_BACKGROUND: Color = [255, 255, 255];
const PAGE_TEXT: Color = [20, 20, 20];
const TITLE_BAR: Color = [0, 71, 125];
const TITLE_TEXT: Color = [255, 255, 255];

/// Row-major RGB viewport
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Blank (black) viewport of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    /// Byte offset of a pixel, `None` outside the viewport
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 3)
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels
            .chunks_exact_mut(3)
            .for_each(|px| px.copy_from_slice(&color));
    }

    /// Paint a rectangle; the parts outside the viewport are dropped
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        let right = x.saturating_add(w).min(self.width);
        let bottom = y.saturating_add(h).min(self.height);
        if x >= right {
            return;
        }
        for row in y..bottom {
            let span = (self.offset(x, row), self.offset(right - 1, row));
            let (Some(start), Some(end)) = span else {
                continue;
            };
            self.pixels[start..end + 3]
                .chunks_exact_mut(3)
                .for_each(|px| px.copy_from_slice(&color));
        }
    }

    /// Draw one line of text, truncated at the right edge
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, fg: Color, bg: Color) {
        let columns = self.width.saturating_sub(x).div_ceil(GLYPH) as usize;
        for (i, ch) in text.chars().take(columns).enumerate() {
            self.draw_glyph(x + i as u32 * GLYPH, y, ch, fg, bg);
        }
    }

    fn draw_glyph(&mut self, x: u32, y: u32, ch: char, fg: Color, bg: Color) {
        let rows = BASIC_FONTS.get(ch).unwrap_or_default();
        for (dy, bits) in (0..GLYPH).zip(rows) {
            for dx in 0..GLYPH {
                // bit 0 is the leftmost column
                let ink = bits & (1 << dx) != 0;
                self.set_pixel(x + dx, y + dy, if ink { fg } else { bg });
            }
        }
    }

    /// Lay out a page: a title bar followed by one text line per entry
    pub fn render_page(&mut self, title: &str, lines: &[String]) {
        self.fill(PAGE_BACKGROUND);
        self.draw_rect(0, 0, self.width, LINE_HEIGHT + PADDING, TITLE_BAR);
        self.draw_text(PADDING, PADDING / 2 + 2, title, TITLE_TEXT, TITLE_BAR);

        let first = LINE_HEIGHT + PADDING * 2;
        let height = self.height;
        let rows = (first..)
            .step_by(LINE_HEIGHT as usize)
            .take_while(move |y| y + GLYPH <= height);
        for (y, line) in rows.zip(lines) {
            self.draw_text(PADDING, y, line, PAGE_TEXT, PAGE_BACKGROUND);
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        match self.offset(x, y) {
            Some(i) => [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]],
            None => [0; 3],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + 3].copy_from_slice(&color);
        }
    }

    /// Encode the viewport as a PNG screenshot
    pub fn to_png(&self) -> PageResult<Vec<u8>> {
        let image: RgbImage = ImageBuffer::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| PageError::Decode("viewport size mismatch".to_string()))?;
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| PageError::Decode(format!("screenshot encoding failed: {}", e)))?;
        Ok(png.into_inner())
    }
}
