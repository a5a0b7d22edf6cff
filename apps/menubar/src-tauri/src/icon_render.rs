//! Rasterizes short strings into 16×16 tray icons.
//!
//! Text is drawn with `embedded-graphics` bitmap fonts onto an
//! `image::RgbaImage` and written out as PNG. The font is chosen per string
//! from a fixed ladder so that up to four characters fit without clipping.

use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};

use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8, FONT_7X13_BOLD, FONT_9X15_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::display::{delta_operator, sanitize_delta};
use crate::error::RenderError;
use crate::types::DisplayModel;

pub const ICON_SIZE: u32 = 16;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_COLOR: Rgb888 = Rgb888::WHITE;

/// Largest first. Widths: 1×9, 2×7, 3×5, 4×4 pixels all fit in 16.
const FONT_LADDER: [&MonoFont<'static>; 4] = [&FONT_9X15_BOLD, &FONT_7X13_BOLD, &FONT_5X8, &FONT_4X6];

const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

/// Texts for the three rendered tray slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLabels {
    pub glucose: String,
    pub delta: String,
    pub operator: String,
}

impl IconLabels {
    pub fn from_model(model: &DisplayModel, decimal_comma: bool) -> Self {
        Self {
            glucose: icon_text(&model.glucose_value, decimal_comma),
            delta: icon_text(&sanitize_delta(&model.delta_display), decimal_comma),
            operator: delta_operator(&model.delta_display).to_string(),
        }
    }
}

/// Output files for the rendered slots
#[derive(Debug, Clone)]
pub struct IconPaths {
    pub glucose: PathBuf,
    pub delta: PathBuf,
    pub operator: PathBuf,
}

impl IconPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            glucose: dir.join("glucose.png"),
            delta: dir.join("delta.png"),
            operator: dir.join("operator.png"),
        }
    }
}

fn icon_text(text: &str, decimal_comma: bool) -> String {
    if decimal_comma {
        text.replace('.', ",")
    } else {
        text.to_string()
    }
}

/// Adapts an `RgbaImage` to an `embedded-graphics` draw target.
struct IconCanvas(RgbaImage);

impl OriginDimensions for IconCanvas {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for IconCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.0.dimensions();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < width && y < height {
                self.0
                    .put_pixel(x, y, Rgba([color.r(), color.g(), color.b(), 255]));
            }
        }
        Ok(())
    }
}

fn text_at_origin<'a>(label: &'a str, font: &'static MonoFont<'static>) -> Text<'a, MonoTextStyle<'static, Rgb888>> {
    Text::with_text_style(label, Point::zero(), MonoTextStyle::new(font, TEXT_COLOR), TOP_LEFT)
}

fn pick_font(label: &str) -> &'static MonoFont<'static> {
    FONT_LADDER
        .iter()
        .copied()
        .find(|font| {
            let size = text_at_origin(label, *font).bounding_box().size;
            size.width <= ICON_SIZE && size.height <= ICON_SIZE
        })
        .unwrap_or(FONT_LADDER[FONT_LADDER.len() - 1])
}

/// The label positioned in the middle of the canvas.
fn layout(label: &str) -> Text<'_, MonoTextStyle<'static, Rgb888>> {
    let text = text_at_origin(label, pick_font(label));
    let bbox = text.bounding_box();
    let canvas = ICON_SIZE as i32;
    let centered = Point::new(
        (canvas - bbox.size.width as i32) / 2,
        (canvas - bbox.size.height as i32) / 2,
    );
    text.translate(centered - bbox.top_left)
}

/// Text box the label occupies on the canvas
#[cfg(test)]
fn text_box(label: &str) -> embedded_graphics::primitives::Rectangle {
    layout(label).bounding_box()
}

/// Draw `label` white on an opaque black 16×16 canvas.
pub fn render_icon_image(label: &str) -> RgbaImage {
    let mut canvas = IconCanvas(RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, BACKGROUND));
    let Ok(_) = layout(label).draw(&mut canvas);
    canvas.0
}

/// Render `label` and replace the PNG at `path`.
/// The image goes to a sibling temp file first so readers never see a partial file.
pub fn render_icon(label: &str, path: &Path) -> Result<(), RenderError> {
    let image = render_icon_image(label);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp = path.with_extension("png.tmp");
    image.save_with_format(&tmp, ImageFormat::Png)?;
    fs::rename(&tmp, path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
