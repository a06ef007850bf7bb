//! Call-side collaborators of the turn controller
//!
//! - Speech output for interviewer lines (console or silent)
//! - Media input handles (camera, microphone, screen) released when the call ends

mod inputs;
mod speech;

pub use inputs::{MediaInputs, MediaKind, MediaTracks};
pub use speech::{speaking_duration, ConsoleSpeech, SilentSpeech, SpeechOutput};
