//! Collaborator traits
//!
//! These traits define the seams between the controller and everything it
//! does not own: the chess engine, the actuator output link, the blocking
//! delay source, and the voice/speech collaborators.

pub mod engine;
pub mod link;
pub mod timer;
pub mod voice;

pub use engine::{Announcement, ChessEngine, MAX_ANNOUNCEMENT_LEN};
pub use link::{ActuatorLink, Line, LinkError, LINE_COUNT};
pub use timer::Delay;
pub use voice::{SpeechInput, SpeechOutput, Utterance, MAX_UTTERANCE_LEN};
