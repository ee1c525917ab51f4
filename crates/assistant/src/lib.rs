//! Optional AI collaborators: the conversational assistant and the camera
//! object detector. Both are plain HTTP clients; callers decide what to do
//! when they are not configured or fail.

pub mod detector;
pub mod error;
pub mod llm;

pub use error::AssistantError;
