//! Decoding, scaling and playback of the displayed image.

mod animation;

pub use animation::{Animation, Frame};

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use iced::widget::image::Handle;
use image::codecs::gif::GifDecoder;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, ImageError, ImageFormat, ImageReader, RgbaImage};
use thiserror::Error;

use crate::fit::{Bounds, Size, compute_fitted_size};

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Could not open {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    #[error("Could not decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("{} has no frames", .path.display())]
    NoFrames { path: PathBuf },
}

impl ImageLoadError {
    fn from_io_error(path: &Path, err: io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    fn from_image_error(path: &Path, err: ImageError) -> Self {
        match err {
            ImageError::IoError(err) => Self::from_io_error(path, err),
            err => Self::Decode {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        }
    }
}

/// Full-resolution pixels, kept so a bounds change can rescale without
/// touching the file again.
#[derive(Debug)]
enum Source {
    Still(RgbaImage),
    Animated(Vec<(RgbaImage, Duration)>),
}

/// What the window renders.
#[derive(Debug)]
enum Content {
    Still(Handle),
    Animated(Animation),
}

#[derive(Debug)]
pub struct DisplayedImage {
    path: PathBuf,
    intrinsic: Size,
    fitted: Size,
    source: Source,
    content: Content,
}

/// Decodes `path` and scales it to fit `bounds`.
///
/// The format comes from the file content; the extension is only used when
/// the content is not recognized. GIFs are played as animations, anything
/// else is a still image.
pub fn load(path: &Path, bounds: Bounds) -> Result<DisplayedImage, ImageLoadError> {
    let reader = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|err| ImageLoadError::from_io_error(path, err))?;

    let source = if reader.format() == Some(ImageFormat::Gif) {
        Source::Animated(decode_gif(path, reader.into_inner())?)
    } else {
        let image = reader
            .decode()
            .map_err(|err| ImageLoadError::from_image_error(path, err))?;
        Source::Still(image.to_rgba8())
    };

    let intrinsic = match &source {
        Source::Still(image) => Size::new(image.width(), image.height()),
        Source::Animated(frames) => {
            let (first, _) = &frames[0];
            Size::new(first.width(), first.height())
        }
    };

    let fitted = compute_fitted_size(intrinsic, bounds);
    let content = render(&source, intrinsic, fitted);

    tracing::info!(
        "Loaded {:?}: {intrinsic} displayed at {fitted}",
        path
    );

    Ok(DisplayedImage {
        path: path.to_path_buf(),
        intrinsic,
        fitted,
        source,
        content,
    })
}

fn decode_gif(
    path: &Path,
    file: BufReader<File>,
) -> Result<Vec<(RgbaImage, Duration)>, ImageLoadError> {
    let frames = GifDecoder::new(file)
        .and_then(|decoder| decoder.into_frames().collect_frames())
        .map_err(|err| ImageLoadError::from_image_error(path, err))?;

    if frames.is_empty() {
        return Err(ImageLoadError::NoFrames {
            path: path.to_path_buf(),
        });
    }

    Ok(frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let delay = Duration::from_micros(u64::from(numer) * 1000 / u64::from(denom.max(1)));
            (frame.into_buffer(), animation::effective_delay(delay))
        })
        .collect())
}

fn scale(image: &RgbaImage, intrinsic: Size, fitted: Size) -> Handle {
    // A degenerate fit still needs a drawable buffer.
    let target = fitted.max(Size::new(1, 1));

    if target == intrinsic {
        return Handle::from_rgba(image.width(), image.height(), image.as_raw().clone());
    }

    let scaled = imageops::resize(image, target.width, target.height, FilterType::Triangle);
    Handle::from_rgba(target.width, target.height, scaled.into_raw())
}

fn render(source: &Source, intrinsic: Size, fitted: Size) -> Content {
    match source {
        Source::Still(image) => Content::Still(scale(image, intrinsic, fitted)),
        Source::Animated(frames) => Content::Animated(Animation::new(
            frames
                .iter()
                .map(|(image, delay)| Frame {
                    handle: scale(image, intrinsic, fitted),
                    delay: *delay,
                })
                .collect(),
        )),
    }
}

impl DisplayedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn intrinsic(&self) -> Size {
        self.intrinsic
    }

    pub fn fitted(&self) -> Size {
        self.fitted
    }

    pub fn animation(&self) -> Option<&Animation> {
        match &self.content {
            Content::Animated(animation) => Some(animation),
            Content::Still(_) => None,
        }
    }

    pub fn animation_mut(&mut self) -> Option<&mut Animation> {
        match &mut self.content {
            Content::Animated(animation) => Some(animation),
            Content::Still(_) => None,
        }
    }

    /// The handle to draw right now.
    pub fn current_handle(&self) -> Option<&Handle> {
        match &self.content {
            Content::Still(handle) => Some(handle),
            Content::Animated(animation) => animation.current().map(|frame| &frame.handle),
        }
    }

    /// Recomputes the fitted size from the intrinsic size and rescales.
    /// Returns the new fitted size.
    pub fn refit(&mut self, bounds: Bounds) -> Size {
        let fitted = compute_fitted_size(self.intrinsic, bounds);
        if fitted != self.fitted {
            self.release();
            self.fitted = fitted;
            self.content = render(&self.source, self.intrinsic, fitted);
            tracing::debug!("Refitted {:?} to {fitted}", self.path);
        }
        fitted
    }

    /// Stops a running animation and frees its frames.
    pub fn release(&mut self) {
        if let Some(animation) = self.animation_mut() {
            animation.stop();
            tracing::debug!("Released animation for {:?}", self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Rgba};
    use std::fs;
    use tempfile::TempDir;

    fn bounds(w: u32, h: u32) -> Bounds {
        Bounds::new(w, h).unwrap()
    }

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(width, height, Rgba([200, 40, 90, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn write_gif(dir: &TempDir, name: &str, frame_count: usize) -> PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut encoder = GifEncoder::new(file);
        let frames = (0..frame_count).map(|i| {
            let shade = (i * 60) as u8;
            image::Frame::from_parts(
                RgbaImage::from_pixel(60, 30, Rgba([shade, shade, shade, 255])),
                0,
                0,
                Delay::from_numer_denom_ms(70, 1),
            )
        });
        encoder.encode_frames(frames).unwrap();
        path
    }

    #[test]
    fn test_still_image_scaled_to_bounds() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "wide.png", 400, 200);

        let image = load(&path, bounds(100, 100)).unwrap();
        assert_eq!(image.intrinsic(), Size::new(400, 200));
        assert_eq!(image.fitted(), Size::new(100, 50));
        assert!(image.animation().is_none());
        assert!(image.current_handle().is_some());
        assert_eq!(image.path(), path.as_path());
    }

    #[test]
    fn test_small_image_not_enlarged() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "small.PNG", 30, 20);

        let image = load(&path, bounds(1920, 1080)).unwrap();
        assert_eq!(image.fitted(), Size::new(30, 20));
    }

    #[test]
    fn test_gif_loads_as_animation() {
        let dir = TempDir::new().unwrap();
        let path = write_gif(&dir, "dance.gif", 3);

        let image = load(&path, bounds(30, 30)).unwrap();
        assert_eq!(image.intrinsic(), Size::new(60, 30));
        assert_eq!(image.fitted(), Size::new(30, 15));

        let animation = image.animation().unwrap();
        assert!(animation.is_running());
        assert_eq!(animation.frame_count(), 3);
        assert_eq!(animation.current_delay(), Some(Duration::from_millis(70)));
    }

    #[test]
    fn test_refit_rescales_from_intrinsic() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "tall.png", 100, 400);

        let mut image = load(&path, bounds(50, 50)).unwrap();
        assert_eq!(image.fitted(), Size::new(12, 50));

        assert_eq!(image.refit(bounds(1000, 200)), Size::new(50, 200));
        assert_eq!(image.refit(bounds(1000, 1000)), Size::new(100, 400));
        assert_eq!(image.intrinsic(), Size::new(100, 400));
    }

    #[test]
    fn test_release_stops_animation() {
        let dir = TempDir::new().unwrap();
        let path = write_gif(&dir, "loop.gif", 2);

        let mut image = load(&path, bounds(100, 100)).unwrap();
        image.release();
        let animation = image.animation().unwrap();
        assert!(!animation.is_running());
        assert_eq!(animation.frame_count(), 0);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.png");
        assert!(matches!(
            load(&path, bounds(10, 10)),
            Err(ImageLoadError::Open { .. })
        ));

        let gif = dir.path().join("missing.gif");
        assert!(matches!(
            load(&gif, bounds(10, 10)),
            Err(ImageLoadError::Open { .. })
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let err = load(&path, bounds(10, 10)).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }), "{err}");
    }

    #[test]
    fn test_png_named_jpg_is_decoded_by_content() {
        let dir = TempDir::new().unwrap();
        let png = write_png(&dir, "real.png", 10, 10);
        let misnamed = dir.path().join("real.jpg");
        fs::copy(&png, &misnamed).unwrap();

        let image = load(&misnamed, bounds(100, 100)).unwrap();
        assert_eq!(image.intrinsic(), Size::new(10, 10));
        assert!(image.animation().is_none());
    }

    #[test]
    fn test_gif_content_animates_whatever_the_extension() {
        let dir = TempDir::new().unwrap();
        let gif = write_gif(&dir, "dance.gif", 2);
        let misnamed = dir.path().join("dance.png");
        fs::copy(&gif, &misnamed).unwrap();

        let image = load(&misnamed, bounds(100, 100)).unwrap();
        assert_eq!(image.animation().unwrap().frame_count(), 2);

        let png = write_png(&dir, "still.png", 8, 8);
        let still = dir.path().join("still.gif");
        fs::copy(&png, &still).unwrap();
        assert!(load(&still, bounds(100, 100)).unwrap().animation().is_none());
    }
}
