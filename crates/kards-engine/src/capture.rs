//! Image capture and normalization.
//!
//! Every card image, whether grabbed from a live camera or loaded from an
//! uploaded file, goes through the same normalization pass before it is sent
//! for extraction or stored for display: a contrast boost of 1.4x followed by
//! a brightness boost of 1.05x at the source's native resolution, encoded as
//! JPEG at quality 95.
//!
//! Camera access is modelled as a scoped resource. A [`CameraSession`] owns the
//! open video stream and stops it when a still is captured, when it is
//! released explicitly, or when it is dropped on any other path.
//!
//! # Example
//!
//! ```no_run
//! use kards_engine::capture::normalize_upload;
//!
//! # fn example() -> Result<(), kards_engine::capture::CaptureError> {
//! let bytes = std::fs::read("card.png").unwrap_or_default();
//! let image = normalize_upload(&bytes)?;
//! println!("{}x{}, {} bytes", image.width(), image.height(), image.jpeg_bytes().len());
//! # Ok(())
//! # }
//! ```

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, ImageResult, RgbImage};
use thiserror::Error;
use tracing::{debug, warn};

/// Contrast multiplier applied before extraction.
pub const CONTRAST: f32 = 1.4;

/// Brightness multiplier applied after contrast.
pub const BRIGHTNESS: f32 = 1.05;

/// JPEG quality of the normalized image.
pub const JPEG_QUALITY: u8 = 95;

/// Errors from the camera or from decoding an uploaded image.
///
/// All of them are recoverable: the user retries or switches input method.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The camera could not be opened (no device, permission denied).
    #[error("Could not access camera: {0}")]
    CameraUnavailable(String),

    /// The stream has no frame to capture yet.
    #[error("Camera is not ready")]
    NoFrame,

    /// An uploaded file is not a readable image.
    #[error("Failed to load the uploaded image: {0}")]
    UnreadableImage(String),

    /// The normalized image could not be encoded.
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// A normalized card image, JPEG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

impl NormalizedImage {
    /// The encoded JPEG bytes.
    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The JPEG bytes, base64 encoded for transport.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.jpeg)
    }

    /// A self-contained `data:` URL suitable for display and storage.
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.base64())
    }
}

/// Normalize a decoded image.
pub fn normalize(image: &DynamicImage) -> Result<NormalizedImage, CaptureError> {
    let mut rgb: RgbImage = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let lut = filter_table();
    for channel in rgb.iter_mut() {
        *channel = lut[*channel as usize];
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut Cursor::new(&mut jpeg), JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    debug!(width, height, jpeg_len = jpeg.len(), "normalized card image");

    Ok(NormalizedImage {
        jpeg,
        width,
        height,
    })
}

/// Decode an uploaded file and normalize it.
///
/// The format is detected from the file contents. Phone photos are usually
/// stored sideways with an EXIF Orientation tag; the tag is applied so the
/// card comes out upright.
pub fn normalize_upload(bytes: &[u8]) -> Result<NormalizedImage, CaptureError> {
    let image = decode_upright(bytes).map_err(|e| {
        warn!(error = %e, len = bytes.len(), "unreadable upload");
        CaptureError::UnreadableImage(e.to_string())
    })?;
    normalize(&image)
}

fn decode_upright(bytes: &[u8]) -> ImageResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    if orientation != Orientation::NoTransforms {
        debug!(?orientation, "rotating upload upright");
        image.apply_orientation(orientation);
    }
    Ok(image)
}

/// Per-channel lookup table for contrast then brightness.
///
/// Each step is clamped to the displayable range before the next.
fn filter_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    for (value, slot) in table.iter_mut().enumerate() {
        let v = value as f32 / 255.0;
        let v = ((v - 0.5) * CONTRAST + 0.5).clamp(0.0, 1.0);
        let v = (v * BRIGHTNESS).clamp(0.0, 1.0);
        *slot = (v * 255.0).round() as u8;
    }
    table
}

/// Which way the requested camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera, pointed away from the user.
    #[default]
    Environment,
    /// Front camera.
    User,
}

/// A live video stream from a camera device.
pub trait VideoStream: Send {
    /// The current frame at the stream's native resolution.
    fn frame(&mut self) -> Result<DynamicImage, CaptureError>;

    /// Stop every track and release the device.
    fn stop(&mut self);
}

/// A camera device that can be opened as a video stream.
pub trait Camera: Send + Sync {
    /// Open a stream facing the given direction.
    fn open(&self, facing: Facing) -> Result<Box<dyn VideoStream>, CaptureError>;
}

/// An open camera stream, released on every exit path.
pub struct CameraSession {
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraSession {
    /// Open the rear-facing camera.
    pub fn start(camera: &dyn Camera) -> Result<Self, CaptureError> {
        let stream = camera.open(Facing::Environment).inspect_err(|e| {
            warn!(error = %e, "camera unavailable");
        })?;
        debug!("camera stream started");
        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Whether the stream is still held.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Grab the current frame, release the camera, and normalize the frame.
    ///
    /// The stream is released whether or not a frame was available.
    pub fn capture(mut self) -> Result<NormalizedImage, CaptureError> {
        let frame = match self.stream.as_mut() {
            Some(stream) => stream.frame(),
            None => Err(CaptureError::NoFrame),
        };
        self.release();
        normalize(&frame?)
    }

    /// Stop the stream. Calling this more than once is harmless.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("camera stream released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, Rgba, RgbaImage};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A fake camera that serves a fixed frame and counts stops.
    struct FakeCamera {
        frame: Option<DynamicImage>,
        fail_open: bool,
        stops: Arc<AtomicUsize>,
    }

    impl FakeCamera {
        fn with_frame(frame: DynamicImage) -> Self {
            Self {
                frame: Some(frame),
                fail_open: false,
                stops: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct FakeStream {
        frame: Option<DynamicImage>,
        stops: Arc<AtomicUsize>,
    }

    impl VideoStream for FakeStream {
        fn frame(&mut self) -> Result<DynamicImage, CaptureError> {
            self.frame.clone().ok_or(CaptureError::NoFrame)
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Camera for FakeCamera {
        fn open(&self, facing: Facing) -> Result<Box<dyn VideoStream>, CaptureError> {
            assert_eq!(facing, Facing::Environment);
            if self.fail_open {
                return Err(CaptureError::CameraUnavailable("permission denied".into()));
            }
            Ok(Box::new(FakeStream {
                frame: self.frame.clone(),
                stops: Arc::clone(&self.stops),
            }))
        }
    }

    fn sample_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([128, 64, 200])))
    }

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        sample_image(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_filter_table() {
        let lut = filter_table();
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert_eq!(lut[128], 135);
        assert_eq!(lut[64], 41);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_normalize_keeps_native_size() {
        let normalized = normalize(&sample_image(40, 24)).unwrap();
        assert_eq!(normalized.width(), 40);
        assert_eq!(normalized.height(), 24);
        assert_eq!(&normalized.jpeg_bytes()[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(normalized.jpeg_bytes()).unwrap();
        assert_eq!(decoded.width(), 40);
        assert_eq!(decoded.height(), 24);
    }

    #[test]
    fn test_normalize_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 0])));
        let normalized = normalize(&rgba).unwrap();
        let decoded = image::load_from_memory(normalized.jpeg_bytes()).unwrap();
        assert_eq!(decoded.color().channel_count(), 3);
    }

    #[test]
    fn test_data_url() {
        let normalized = normalize(&sample_image(4, 4)).unwrap();
        let url = normalized.data_url();
        assert!(url.starts_with("data:image/jpeg;base64,/9j/"));
        assert_eq!(
            STANDARD.decode(normalized.base64()).unwrap(),
            normalized.jpeg_bytes()
        );
    }

    #[test]
    fn test_normalize_upload_png() {
        let normalized = normalize_upload(&sample_png(16, 10)).unwrap();
        assert_eq!((normalized.width(), normalized.height()), (16, 10));
    }

    /// A JPEG carrying an APP1 Exif block with the given Orientation value.
    fn jpeg_with_orientation(width: u32, height: u32, orientation: u8) -> Vec<u8> {
        let mut jpeg = Vec::new();
        JpegEncoder::new(&mut Cursor::new(&mut jpeg))
            .encode_image(&sample_image(width, height).to_rgb8())
            .unwrap();

        #[rustfmt::skip]
        let tiff = [
            b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, // big endian, IFD at 8
            0x00, 0x01,                                     // one entry
            0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, // Orientation, SHORT, 1
            0x00, orientation, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,                         // no next IFD
        ];
        let mut app1 = vec![0xFF, 0xE1];
        let len = (2 + 6 + tiff.len()) as u16;
        app1.extend_from_slice(&len.to_be_bytes());
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(&tiff);

        // Splice in right after SOI.
        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&app1);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_normalize_upload_applies_exif_orientation() {
        let rotated = normalize_upload(&jpeg_with_orientation(40, 20, 6)).unwrap();
        assert_eq!((rotated.width(), rotated.height()), (20, 40));

        let decoded = image::load_from_memory(rotated.jpeg_bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 40));
    }

    #[test]
    fn test_normalize_upload_upright_orientation_untouched() {
        let upright = normalize_upload(&jpeg_with_orientation(40, 20, 1)).unwrap();
        assert_eq!((upright.width(), upright.height()), (40, 20));
    }

    #[test]
    fn test_normalize_upload_garbage() {
        let err = normalize_upload(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CaptureError::UnreadableImage(_)));
    }

    #[test]
    fn test_session_released_on_capture() {
        let camera = FakeCamera::with_frame(sample_image(8, 8));
        let session = CameraSession::start(&camera).unwrap();
        assert!(session.is_active());

        let image = session.capture().unwrap();
        assert_eq!(image.width(), 8);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_session_released_on_drop() {
        let camera = FakeCamera::with_frame(sample_image(8, 8));
        {
            let _session = CameraSession::start(&camera).unwrap();
        }
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_session_released_when_no_frame() {
        let camera = FakeCamera {
            frame: None,
            fail_open: false,
            stops: Arc::new(AtomicUsize::new(0)),
        };
        let session = CameraSession::start(&camera).unwrap();
        let err = session.capture().unwrap_err();
        assert!(matches!(err, CaptureError::NoFrame));
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_is_idempotent() {
        let camera = FakeCamera::with_frame(sample_image(8, 8));
        let mut session = CameraSession::start(&camera).unwrap();
        session.release();
        session.release();
        assert!(!session.is_active());
        drop(session);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_camera_unavailable() {
        let camera = FakeCamera {
            frame: None,
            fail_open: true,
            stops: Arc::new(AtomicUsize::new(0)),
        };
        let err = CameraSession::start(&camera).unwrap_err();
        assert!(matches!(err, CaptureError::CameraUnavailable(_)));
    }
}
