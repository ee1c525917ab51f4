//! Hardware-facing collaborators: the ESP32 sensor board and the camera.
//!
//! Both are modelled as small capability traits ([`source::SensorSource`],
//! [`camera::FrameSource`]) so the API layer can be tested with fakes and the
//! core evaluator never touches I/O.

pub mod camera;
pub mod error;
pub mod esp32;
pub mod source;

pub use error::DeviceError;
