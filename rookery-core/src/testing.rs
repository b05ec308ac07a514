//! Shared test doubles for the controller collaborators

use core::cell::Cell;
use std::string::String;
use std::vec::Vec;

use crate::traits::{
    ActuatorLink, Announcement, ChessEngine, Delay, Line, LinkError, SpeechInput, SpeechOutput,
    Utterance, LINE_COUNT,
};

/// Link that records levels, edges and per-tick activity
#[derive(Debug, Default)]
pub struct MockLink {
    pub levels: [bool; LINE_COUNT],
    pub writes: u32,
    pub fail_on: Option<Line>,
    per_line: [u32; LINE_COUNT],
    rising: [u32; LINE_COUNT],
    rising_forward: [u32; LINE_COUNT],
    this_tick: [bool; LINE_COUNT],
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_tick(&mut self) {
        self.this_tick = [false; LINE_COUNT];
    }

    pub fn level(&self, line: Line) -> bool {
        self.levels[line.index()]
    }

    /// Low-to-high transitions on a line
    pub fn pulses(&self, line: Line) -> u32 {
        self.rising[line.index()]
    }

    /// Rising edges on a step line taken with its direction line high
    pub fn forward_pulses(&self, line: Line) -> u32 {
        self.rising_forward[line.index()]
    }

    pub fn writes_to(&self, line: Line) -> u32 {
        self.per_line[line.index()]
    }

    pub fn tick_touched_magnet(&self) -> bool {
        Line::ALL
            .iter()
            .any(|l| l.is_magnet() && self.this_tick[l.index()])
    }

    pub fn tick_touched_translation(&self) -> bool {
        Line::ALL
            .iter()
            .any(|l| !l.is_magnet() && self.this_tick[l.index()])
    }
}

impl ActuatorLink for MockLink {
    fn write(&mut self, line: Line, high: bool) -> Result<(), LinkError> {
        if self.fail_on == Some(line) {
            return Err(LinkError::PinRejected(line));
        }
        let i = line.index();
        if high && !self.levels[i] {
            self.rising[i] += 1;
            let dir = match line {
                Line::FileStep => Some(Line::FileDir),
                Line::RankStep => Some(Line::RankDir),
                Line::MagnetDrive => Some(Line::MagnetDir),
                _ => None,
            };
            if dir.is_some_and(|d| self.levels[d.index()]) {
                self.rising_forward[i] += 1;
            }
        }
        self.levels[i] = high;
        self.writes += 1;
        self.per_line[i] += 1;
        self.this_tick[i] = true;
        Ok(())
    }
}

/// Delay that only accumulates the requested time
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_us: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.total_us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_us += u64::from(ms) * 1_000;
    }
}

/// One queued motion command in raw engine form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Queued {
    pub tag: i32,
    pub int: i32,
    pub a: f32,
    pub b: f32,
}

impl Queued {
    pub fn magnet(value: i32) -> Self {
        Self { tag: 0, int: value, a: 0.0, b: 0.0 }
    }

    pub fn file(delta: f32) -> Self {
        Self { tag: 1, int: 0, a: 0.0, b: delta }
    }

    pub fn rank(delta: f32) -> Self {
        Self { tag: 2, int: 0, a: 0.0, b: delta }
    }

    pub fn diagonal(file: f32, rank: f32) -> Self {
        Self { tag: 3, int: 0, a: file, b: rank }
    }
}

/// Engine reaction to one submitted move
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub commands: Vec<Queued>,
    pub turn: Option<i32>,
    pub announcement: Option<&'static str>,
    pub ends_game: bool,
}

/// Engine whose behavior is scripted move by move
///
/// Once the replies run out the next submission ends the game.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub queue: Vec<Queued>,
    pub running: bool,
    pub turn: i32,
    pub white: i32,
    pub announcements: Vec<String>,
    pub init_commands: Vec<Queued>,
    pub recalibrate_commands: Vec<Queued>,
    pub replies: Vec<Reply>,
    pub submitted: Vec<String>,
    pub recalibrations: u32,
    pub inits: u32,
    pub prints: u32,
    pub resets: u32,
    /// Report the game over once this many liveness checks have happened
    pub stop_after_checks: Option<u32>,
    checks: Cell<u32>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    pub fn queue(&mut self, command: Queued) {
        self.queue.push(command);
    }

    pub fn announce(&mut self, text: &str) {
        self.announcements.push(String::from(text));
    }

    fn head(&self) -> Queued {
        self.queue[0]
    }

    fn pop(&mut self) -> Queued {
        self.queue.remove(0)
    }
}

impl ChessEngine for ScriptedEngine {
    fn init_board(&mut self) {
        self.inits += 1;
        self.running = true;
        let commands = core::mem::take(&mut self.init_commands);
        self.queue.extend(commands);
    }

    fn print_board(&mut self) {
        self.prints += 1;
    }

    fn reset_game(&mut self) {
        self.resets += 1;
        self.queue.clear();
    }

    fn is_running(&self) -> bool {
        let checks = self.checks.get() + 1;
        self.checks.set(checks);
        if self.stop_after_checks.is_some_and(|n| checks > n) {
            return false;
        }
        self.running
    }

    fn turn(&self) -> i32 {
        self.turn
    }

    fn white_side(&self) -> i32 {
        self.white
    }

    fn has_pending_command(&self) -> bool {
        !self.queue.is_empty()
    }

    fn command_tag(&self) -> i32 {
        self.head().tag
    }

    fn int_payload(&mut self) -> i32 {
        self.pop().int
    }

    fn float_payload_a(&self) -> f32 {
        self.head().a
    }

    fn float_payload_b(&mut self) -> f32 {
        self.pop().b
    }

    fn take_announcement(&mut self) -> Option<Announcement> {
        if self.announcements.is_empty() {
            return None;
        }
        let text = self.announcements.remove(0);
        let mut out = Announcement::new();
        out.push_str(&text).ok()?;
        Some(out)
    }

    fn submit_move(&mut self, text: &str) {
        self.submitted.push(String::from(text));
        if self.replies.is_empty() {
            self.running = false;
            return;
        }
        let reply = self.replies.remove(0);
        self.queue.extend(reply.commands);
        if let Some(turn) = reply.turn {
            self.turn = turn;
        }
        if let Some(text) = reply.announcement {
            self.announce(text);
        }
        if reply.ends_game {
            self.running = false;
        }
    }

    fn recalibrate(&mut self) {
        self.recalibrations += 1;
        let commands = core::mem::take(&mut self.recalibrate_commands);
        self.queue.extend(commands);
    }
}

/// Voice input returning canned utterances, then empty strings
#[derive(Debug, Default)]
pub struct MockVoice {
    pub utterances: Vec<&'static str>,
    pub listens: u32,
}

impl MockVoice {
    pub fn saying(utterances: &[&'static str]) -> Self {
        Self {
            utterances: utterances.to_vec(),
            listens: 0,
        }
    }
}

impl SpeechInput for MockVoice {
    fn listen(&mut self) -> Utterance {
        self.listens += 1;
        let mut out = Utterance::new();
        if !self.utterances.is_empty() {
            let text = self.utterances.remove(0);
            let _ = out.push_str(text);
        }
        out
    }
}

/// Speech output that records everything spoken
#[derive(Debug, Default)]
pub struct MockSpeech {
    pub spoken: Vec<String>,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechOutput for MockSpeech {
    fn speak(&mut self, text: &str) {
        self.spoken.push(String::from(text));
    }
}
