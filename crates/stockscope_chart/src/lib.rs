pub mod figure;

use std::path::Path;

use thiserror::Error;

pub use figure::{FigureSpec, render};

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart drawing error: {0}")]
    Draw(String),
    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Cannot chart an empty series")]
    EmptySeries,
}

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 800;

/// A finished figure held as raw RGB pixels. Nothing touches the
/// filesystem until the caller asks for `save_png`.
pub struct RenderedChart {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl RenderedChart {
    pub(crate) fn new(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        Self { width, height, rgb }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when every pixel still has the background color.
    pub fn is_blank(&self) -> bool {
        self.rgb.iter().all(|&b| b == 0xff)
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ChartError> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.rgb.clone())
            .ok_or_else(|| {
                ChartError::Draw("RGB buffer does not match chart dimensions".to_string())
            })?;
        img.save_with_format(path, image::ImageFormat::Png)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_buffer_is_blank() {
        let chart = RenderedChart::new(4, 4, vec![0xff; 4 * 4 * 3]);
        assert!(chart.is_blank());
        assert_eq!(chart.dimensions(), (4, 4));
    }

    #[test]
    fn save_rejects_mismatched_buffer() {
        let chart = RenderedChart::new(10, 10, vec![0xff; 8]);
        let path = std::env::temp_dir().join("stockscope_chart_bad_buffer.png");
        assert!(matches!(chart.save_png(&path), Err(ChartError::Draw(_))));
        assert!(!path.exists());
    }

    #[test]
    fn save_writes_png() {
        let chart = RenderedChart::new(8, 8, vec![0x20; 8 * 8 * 3]);
        let path = std::env::temp_dir().join(format!(
            "stockscope_chart_save_{}.png",
            std::process::id()
        ));

        chart.save_png(&path).expect("Failed to save png");
        let meta = std::fs::metadata(&path).expect("File missing");
        assert!(meta.len() > 0);

        std::fs::remove_file(&path).ok();
    }
}
