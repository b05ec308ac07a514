//! Voice collaborator traits

use heapless::String;

/// Maximum recognized utterance length in bytes
pub const MAX_UTTERANCE_LEN: usize = 256;

/// Recognized utterance text
pub type Utterance = String<MAX_UTTERANCE_LEN>;

/// Speech-to-text capture
pub trait SpeechInput {
    /// Block until the player has spoken and return the recognized text
    ///
    /// Recognition failures return an empty utterance. There is no timeout.
    fn listen(&mut self) -> Utterance;
}

/// Text-to-speech playback
pub trait SpeechOutput {
    /// Speak the text, blocking until playback completes
    fn speak(&mut self, text: &str);
}
