//! Announcement relay
//!
//! Moves engine announcements to the speech output. Speech blocks, so only
//! one announcement is relayed per tick.

use crate::traits::{ChessEngine, SpeechOutput};

/// Relays engine announcements and controller prompts to speech
#[derive(Debug, Clone, Default)]
pub struct AnnouncementRelay {
    spoken: u32,
}

impl AnnouncementRelay {
    pub const fn new() -> Self {
        Self { spoken: 0 }
    }

    /// Number of utterances spoken so far
    pub fn spoken(&self) -> u32 {
        self.spoken
    }

    /// Speak the engine's pending announcement, if any
    ///
    /// Returns true if something was spoken.
    pub fn drain<E, S>(&mut self, engine: &mut E, speech: &mut S) -> bool
    where
        E: ChessEngine,
        S: SpeechOutput,
    {
        match engine.take_announcement() {
            Some(text) => {
                self.announce(speech, &text);
                true
            }
            None => false,
        }
    }

    /// Speak controller-originated text
    pub fn announce<S: SpeechOutput>(&mut self, speech: &mut S, text: &str) {
        info!("Speaking: {=str}", text);
        speech.speak(text);
        self.spoken = self.spoken.wrapping_add(1);
    }
}
