//! Placeholder JPEG frames shown when no live camera image is available.

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use crate::error::CoreError;

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

const JPEG_QUALITY: u8 = 70;
const BACKGROUND: Rgb<u8> = Rgb([211, 211, 211]);
const BORDER: Rgb<u8> = Rgb([128, 128, 128]);

/// Why a placeholder is being shown. Each reason gets its own banner colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// The exhibit's camera is not configured or has stopped.
    CameraOffline,
    /// The camera is configured but has not delivered a frame yet.
    NoSignal,
    /// The exhibit has no real camera.
    MockCamera,
}

impl PlaceholderKind {
    /// Short label sent alongside the frame (e.g. as a part header).
    pub const fn label(self) -> &'static str {
        match self {
            PlaceholderKind::CameraOffline => "camera-offline",
            PlaceholderKind::NoSignal => "no-signal",
            PlaceholderKind::MockCamera => "mock-camera",
        }
    }

    const fn banner(self) -> Rgb<u8> {
        match self {
            PlaceholderKind::CameraOffline => Rgb([150, 40, 40]),
            PlaceholderKind::NoSignal => Rgb([60, 60, 60]),
            PlaceholderKind::MockCamera => Rgb([40, 90, 150]),
        }
    }
}

/// Pre-encoded placeholder frames, one per [`PlaceholderKind`].
#[derive(Debug, Clone)]
pub struct PlaceholderFrames {
    pub camera_offline: Vec<u8>,
    pub no_signal: Vec<u8>,
    pub mock_camera: Vec<u8>,
}

impl PlaceholderFrames {
    /// Encode every placeholder once.
    pub fn render() -> Result<Self, CoreError> {
        Ok(Self {
            camera_offline: render_placeholder(PlaceholderKind::CameraOffline)?,
            no_signal: render_placeholder(PlaceholderKind::NoSignal)?,
            mock_camera: render_placeholder(PlaceholderKind::MockCamera)?,
        })
    }

    pub fn get(&self, kind: PlaceholderKind) -> &[u8] {
        match kind {
            PlaceholderKind::CameraOffline => &self.camera_offline,
            PlaceholderKind::NoSignal => &self.no_signal,
            PlaceholderKind::MockCamera => &self.mock_camera,
        }
    }
}

/// Render a 640x480 grey frame with a coloured banner across the middle.
pub fn render_placeholder(kind: PlaceholderKind) -> Result<Vec<u8>, CoreError> {
    let banner = kind.banner();
    let band = (FRAME_HEIGHT / 2 - 30)..(FRAME_HEIGHT / 2 + 30);

    let img = RgbImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        if x < 4 || y < 4 || x >= FRAME_WIDTH - 4 || y >= FRAME_HEIGHT - 4 {
            BORDER
        } else if band.contains(&y) {
            banner
        } else {
            BACKGROUND
        }
    });

    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        encoder
            .encode_image(&img)
            .map_err(|e| CoreError::Internal(format!("placeholder encoding failed: {e}")))?;
    }
    Ok(bytes)
}
