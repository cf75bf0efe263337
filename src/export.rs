//! Still and animated image export of fire frames.

use crate::error::ExportError;
use crate::palette::Palette;
use gif::{Encoder, Frame, Repeat};
use image::{Rgb as Pixel, RgbImage};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Colorize a grid through the palette, upscaling each cell to a
/// `scale` x `scale` block (nearest neighbour).
pub fn render_rgb(
    grid: &[u8],
    width: usize,
    height: usize,
    palette: &Palette,
    scale: u32,
) -> Result<RgbImage, ExportError> {
    if scale == 0 {
        return Err(ExportError::InvalidScale);
    }
    if grid.len() != width * height {
        return Err(ExportError::FrameSizeMismatch {
            expected: width * height,
            got: grid.len(),
        });
    }

    let scale = scale as usize;
    let (out_width, out_height) = match (scaled_dim(width, scale), scaled_dim(height, scale)) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(ExportError::TooLarge {
                width: width.saturating_mul(scale),
                height: height.saturating_mul(scale),
            })
        }
    };

    let image = RgbImage::from_fn(out_width, out_height, |px, py| {
        let x = px as usize / scale;
        let y = py as usize / scale;
        let color = palette.color(grid[y * width + x]);
        Pixel([color.r, color.g, color.b])
    });
    Ok(image)
}

/// `len * scale` as an image dimension, if it fits in `u32`
fn scaled_dim(len: usize, scale: usize) -> Option<u32> {
    len.checked_mul(scale).and_then(|v| u32::try_from(v).ok())
}

/// Write a single colorized frame as PNG
pub fn save_png(
    path: &Path,
    grid: &[u8],
    width: usize,
    height: usize,
    palette: &Palette,
    scale: u32,
) -> Result<(), ExportError> {
    let image = render_rgb(grid, width, height, palette, scale)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    info!(path = %path.display(), width, height, scale, "saved PNG snapshot");
    Ok(())
}

/// Collects raw grid frames and writes them as a looping GIF.
///
/// Grid bytes are used directly as indices into the GIF's global color
/// table, which is the palette itself, so no color quantization happens.
pub struct GifRecorder {
    width: usize,
    height: usize,
    frames: Vec<Vec<u8>>,
}

impl GifRecorder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
        }
    }

    /// Copy the current grid into the recording
    pub fn capture(&mut self, grid: &[u8]) -> Result<(), ExportError> {
        let expected = self.width * self.height;
        if grid.len() != expected {
            return Err(ExportError::FrameSizeMismatch {
                expected,
                got: grid.len(),
            });
        }
        self.frames.push(grid.to_vec());
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Encode every captured frame.
    ///
    /// `fps` sets the frame delay (GIF delays are in hundredths of a second).
    pub fn save(
        &self,
        path: &Path,
        palette: &Palette,
        scale: u32,
        fps: u32,
    ) -> Result<(), ExportError> {
        if self.frames.is_empty() {
            return Err(ExportError::EmptyRecording);
        }
        if scale == 0 {
            return Err(ExportError::InvalidScale);
        }

        let scale = scale as usize;
        let out_width = self.width.saturating_mul(scale);
        let out_height = self.height.saturating_mul(scale);
        let dims = (u16::try_from(out_width), u16::try_from(out_height));
        let (gif_width, gif_height) = match dims {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(ExportError::TooLarge {
                    width: out_width,
                    height: out_height,
                })
            }
        };

        // Pad the color table so every intensity byte is a valid index
        let mut table = Vec::with_capacity(256 * 3);
        for value in 0..=u8::MAX {
            let c = palette.color(value);
            table.extend_from_slice(&[c.r, c.g, c.b]);
        }

        let file = BufWriter::new(File::create(path)?);
        let mut encoder = Encoder::new(file, gif_width, gif_height, &table)?;
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = (100 / fps.max(1)).clamp(2, u16::MAX as u32) as u16;
        for grid in &self.frames {
            let mut frame = Frame::default();
            frame.width = gif_width;
            frame.height = gif_height;
            frame.buffer = Cow::Owned(upscale(grid, self.width, self.height, scale));
            frame.delay = delay;
            encoder.write_frame(&frame)?;
        }

        info!(
            path = %path.display(),
            frames = self.frames.len(),
            width = out_width,
            height = out_height,
            "saved GIF recording"
        );
        Ok(())
    }
}

fn upscale(grid: &[u8], width: usize, height: usize, scale: usize) -> Vec<u8> {
    if scale == 1 {
        return grid.to_vec();
    }
    let mut out = Vec::with_capacity(width * height * scale * scale);
    for row in grid.chunks_exact(width) {
        let mut wide = Vec::with_capacity(width * scale);
        for &value in row {
            wide.extend(std::iter::repeat(value).take(scale));
        }
        for _ in 0..scale {
            out.extend_from_slice(&wide);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fire::FireSimulation;
    use crate::settings::FireSettings;
    use tempfile::tempdir;

    #[test]
    fn test_render_rgb_scales_and_colors() {
        let palette = Palette::fire(256).unwrap();
        let grid = [0u8, 255, 85, 0];
        let image = render_rgb(&grid, 2, 2, &palette, 3).unwrap();
        assert_eq!(image.dimensions(), (6, 6));
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(5, 2).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(2, 3).0, [255, 0, 0]);
    }

    #[test]
    fn test_render_rgb_rejects_bad_input() {
        let palette = Palette::default();
        assert!(matches!(
            render_rgb(&[0; 4], 2, 2, &palette, 0),
            Err(ExportError::InvalidScale)
        ));
        assert!(matches!(
            render_rgb(&[0; 3], 2, 2, &palette, 1),
            Err(ExportError::FrameSizeMismatch { expected: 4, got: 3 })
        ));
        // 2 * u32::MAX pixels does not fit an image dimension
        assert!(matches!(
            render_rgb(&[0; 4], 2, 2, &palette, u32::MAX),
            Err(ExportError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_upscale() {
        assert_eq!(
            upscale(&[1, 2, 3, 4], 2, 2, 2),
            vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
        );
        assert_eq!(upscale(&[7, 8], 2, 1, 1), vec![7, 8]);
    }

    #[test]
    fn test_png_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fire.png");
        let sim = FireSimulation::seeded(8, 4, FireSettings::default(), 1).unwrap();
        let palette = Palette::default();

        save_png(&path, sim.grid(), sim.width(), sim.height(), &palette, 2).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (16, 8));
        assert_eq!(loaded.get_pixel(0, 7).0, [255, 255, 255]);
        assert_eq!(loaded.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_gif_recording() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fire.gif");
        let mut sim = FireSimulation::seeded(10, 6, FireSettings::default(), 2).unwrap();
        let mut recorder = GifRecorder::new(sim.width(), sim.height());

        for _ in 0..5 {
            sim.step();
            recorder.capture(sim.grid()).unwrap();
        }
        assert_eq!(recorder.frame_count(), 5);
        recorder.save(&path, &Palette::default(), 2, 30).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..6], b"GIF89a");
    }

    #[test]
    fn test_gif_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.gif");
        let mut recorder = GifRecorder::new(4, 4);
        assert!(matches!(
            recorder.save(&path, &Palette::default(), 1, 30),
            Err(ExportError::EmptyRecording)
        ));
        assert!(matches!(
            recorder.capture(&[0; 5]),
            Err(ExportError::FrameSizeMismatch { expected: 16, got: 5 })
        ));
    }
}
