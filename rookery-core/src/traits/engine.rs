//! Chess engine trait
//!
//! The engine is opaque: it owns the rules, the board model, the turn and
//! the pending motion-command queue. The controller only polls it.

use heapless::String;

/// Maximum announcement length in bytes
pub const MAX_ANNOUNCEMENT_LEN: usize = 128;

/// Announcement text pulled from the engine
pub type Announcement = String<MAX_ANNOUNCEMENT_LEN>;

/// Pull-based interface to the external chess engine
///
/// The command queue follows the engine's polling protocol: check
/// [`has_pending_command`](ChessEngine::has_pending_command), read the tag,
/// then read the payload. Reading [`int_payload`](ChessEngine::int_payload)
/// or [`float_payload_b`](ChessEngine::float_payload_b) dequeues the head
/// command, so `float_payload_a` must be read first when both are needed.
/// Calling any payload accessor with an empty queue is undefined.
pub trait ChessEngine {
    /// Set up a new game; may queue homing motion
    fn init_board(&mut self);

    /// Print the board to the engine's console
    fn print_board(&mut self);

    /// Tear down the finished game
    fn reset_game(&mut self);

    /// Check if the game is still in progress
    fn is_running(&self) -> bool;

    /// Side whose move the engine expects (negative when neither)
    fn turn(&self) -> i32;

    /// Side identifier the engine uses for white
    fn white_side(&self) -> i32;

    /// Check if a motion command is queued
    fn has_pending_command(&self) -> bool;

    /// Raw type tag of the head command
    fn command_tag(&self) -> i32;

    /// Integer payload of the head command; dequeues it
    fn int_payload(&mut self) -> i32;

    /// First float payload of the head command
    fn float_payload_a(&self) -> f32;

    /// Second float payload of the head command; dequeues it
    fn float_payload_b(&mut self) -> f32;

    /// Take the pending announcement, if any
    ///
    /// Each announcement is returned exactly once.
    fn take_announcement(&mut self) -> Option<Announcement>;

    /// Submit a raw move utterance
    ///
    /// Parsing and legality are entirely the engine's concern; an empty
    /// string is a valid (rejected) submission.
    fn submit_move(&mut self, text: &str);

    /// Ask the engine to queue a return of the gantry to the origin
    ///
    /// Engines that track gantry drift queue a combined shift here; the
    /// default does nothing.
    fn recalibrate(&mut self) {}
}
