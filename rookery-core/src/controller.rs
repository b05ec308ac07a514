//! Move execution controller
//!
//! Ties the command adapter, actuator sequencer, turn synchronizer and
//! announcement relay into one cooperative scheduling loop. Each tick does
//! exactly one of: relay an announcement, actuate one step, load a command,
//! or prompt the player.

use core::fmt;

use crate::announce::AnnouncementRelay;
use crate::config::BoardConfig;
use crate::motion::{CommandAdapter, DecodeError, MotionCommand, PositionModel};
use crate::sequencer::{Sequencer, TickReport};
use crate::traits::{ActuatorLink, ChessEngine, Delay, LinkError, SpeechInput, SpeechOutput};
use crate::turn::{TurnState, TurnSynchronizer};

/// Greeting spoken before the first tick when enabled
pub const GREETING: &str = "Welcome to automatic chess!";

/// Fatal controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// A pin write was rejected by the actuator link
    Link(LinkError),
    /// A queued command could not be decoded or applied
    Decode(DecodeError),
}

impl From<LinkError> for ControllerError {
    fn from(e: LinkError) -> Self {
        ControllerError::Link(e)
    }
}

impl From<DecodeError> for ControllerError {
    fn from(e: DecodeError) -> Self {
        ControllerError::Decode(e)
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Link(e) => write!(f, "actuator link failed: {}", e),
            ControllerError::Decode(e) => write!(f, "bad motion command: {}", e),
        }
    }
}

/// Game lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Running the commands queued by `init_board`, travel limits off
    Homing,
    /// Normal play
    Playing,
    /// The engine reported the game finished
    GameOver,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// An engine announcement was spoken
    Announced,
    /// The sequencer stepped
    Actuated(TickReport),
    /// A command was decoded into new targets
    CommandLoaded(MotionCommand),
    /// The engine queued a return to the origin ahead of the prompt
    Recalibrating,
    /// The player was prompted and the utterance submitted
    Prompted,
    /// Homing finished and the gantry position was re-zeroed
    Homed,
    /// The game is over; nothing further will be actuated
    GameOver,
}

/// Running counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerStats {
    pub ticks: u32,
    pub file_pulses: u32,
    pub rank_pulses: u32,
    pub magnet_pulses: u32,
    pub commands: u32,
    pub prompts: u32,
    pub announcements: u32,
}

impl ControllerStats {
    fn record(&mut self, report: &TickReport) {
        if report.file.is_some() {
            self.file_pulses = self.file_pulses.wrapping_add(1);
        }
        if report.rank.is_some() {
            self.rank_pulses = self.rank_pulses.wrapping_add(1);
        }
        if report.magnet.is_some() {
            self.magnet_pulses = self.magnet_pulses.wrapping_add(1);
        }
    }
}

/// Result of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameSummary {
    pub stats: ControllerStats,
    /// Axis positions when the game ended
    pub position: PositionModel,
}

/// Move execution controller
///
/// Owns the position model and every collaborator handle. Nothing is
/// shared; the loop is single threaded and blocks inside delays, speech and
/// voice recognition.
pub struct Controller<E, L, D, V, S> {
    config: BoardConfig,
    engine: E,
    link: L,
    delay: D,
    voice: V,
    speech: S,
    model: PositionModel,
    sequencer: Sequencer,
    adapter: CommandAdapter,
    turns: TurnSynchronizer,
    relay: AnnouncementRelay,
    stats: ControllerStats,
    phase: Phase,
    recalibrated: bool,
}

impl<E, L, D, V, S> Controller<E, L, D, V, S>
where
    E: ChessEngine,
    L: ActuatorLink,
    D: Delay,
    V: SpeechInput,
    S: SpeechOutput,
{
    /// Create a controller with the gantry assumed at the origin
    pub fn new(config: BoardConfig, engine: E, link: L, delay: D, voice: V, speech: S) -> Self {
        Self {
            config,
            engine,
            link,
            delay,
            voice,
            speech,
            model: PositionModel::new(),
            sequencer: Sequencer::new(),
            adapter: CommandAdapter::new(),
            turns: TurnSynchronizer::new(),
            relay: AnnouncementRelay::new(),
            stats: ControllerStats::default(),
            phase: Phase::Playing,
            recalibrated: false,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn model(&self) -> &PositionModel {
        &self.model
    }

    pub fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    /// Release the collaborators
    pub fn into_parts(self) -> (E, L, D, V, S) {
        (self.engine, self.link, self.delay, self.voice, self.speech)
    }

    /// Play one game to completion
    ///
    /// Greets (if configured), sets up the board, ticks until the engine
    /// reports the game over and finally resets the engine. Errors abort
    /// the game without the reset.
    pub fn run(&mut self) -> Result<GameSummary, ControllerError> {
        self.start();
        loop {
            if self.tick()? == TickOutcome::GameOver {
                break;
            }
        }
        self.engine.reset_game();
        info!(
            "Game finished: {} commands, {} prompts",
            self.stats.commands, self.stats.prompts
        );
        Ok(GameSummary {
            stats: self.stats,
            position: self.model,
        })
    }

    fn start(&mut self) {
        self.stats = ControllerStats::default();
        self.sequencer.reset();
        self.turns.reset();
        self.recalibrated = false;

        if self.config.session.greet {
            self.relay.announce(&mut self.speech, GREETING);
            self.stats.announcements = self.stats.announcements.wrapping_add(1);
        }

        self.engine.init_board();
        self.engine.print_board();

        self.phase = if self.config.session.home_on_start {
            info!("Game started, homing");
            Phase::Homing
        } else {
            info!("Game started");
            Phase::Playing
        };
    }

    /// Run one scheduling tick
    ///
    /// Order within a tick: announcement drain, actuation, command loading,
    /// then the liveness check and the player prompt. Commands queued with
    /// the game-ending move still run. Once the game is over every further
    /// tick returns [`TickOutcome::GameOver`] without touching the link.
    pub fn tick(&mut self) -> Result<TickOutcome, ControllerError> {
        if self.phase == Phase::GameOver {
            return Ok(TickOutcome::GameOver);
        }
        self.stats.ticks = self.stats.ticks.wrapping_add(1);

        if self.relay.drain(&mut self.engine, &mut self.speech) {
            self.stats.announcements = self.stats.announcements.wrapping_add(1);
            return Ok(TickOutcome::Announced);
        }

        if !self.sequencer.is_idle() || !self.model.is_at_rest() {
            let report = self
                .sequencer
                .tick(&mut self.model, &self.config, &mut self.link, &mut self.delay)
                .inspect_err(|e| error!("Actuator link failure: {}", e))?;
            self.stats.record(&report);
            return Ok(TickOutcome::Actuated(report));
        }

        if self.phase == Phase::Homing && !self.engine.has_pending_command() {
            self.model.rezero_translation();
            self.phase = Phase::Playing;
            info!("Homing complete");
            return Ok(TickOutcome::Homed);
        }

        if let Some(command) = self.load_command()? {
            return Ok(TickOutcome::CommandLoaded(command));
        }

        // Only checked at rest so the final move is carried out
        if !self.engine.is_running() {
            info!("Engine reports game over");
            self.phase = Phase::GameOver;
            return Ok(TickOutcome::GameOver);
        }

        if self.config.session.recalibrate_before_prompt && !self.recalibrated {
            self.recalibrated = true;
            self.engine.recalibrate();
            if self.engine.has_pending_command() {
                debug!("Recalibrating before prompt");
                return Ok(TickOutcome::Recalibrating);
            }
        }

        self.prompt();
        Ok(TickOutcome::Prompted)
    }

    fn load_command(&mut self) -> Result<Option<MotionCommand>, ControllerError> {
        let Some(command) = self.adapter.poll(&mut self.engine)? else {
            return Ok(None);
        };
        let enforce_travel = self.phase == Phase::Playing;
        self.adapter
            .apply(command, &mut self.model, &self.config, enforce_travel)?;
        self.stats.commands = self.stats.commands.wrapping_add(1);

        if self.config.timing.command_settle_ms > 0 {
            self.delay.delay_ms(self.config.timing.command_settle_ms);
        }
        Ok(Some(command))
    }

    fn prompt(&mut self) {
        let turn = TurnState::of(&self.engine);
        if let Some(text) = self.turns.reconcile(turn) {
            info!("Turn now {:?}", turn);
            self.relay.announce(&mut self.speech, text);
            self.stats.announcements = self.stats.announcements.wrapping_add(1);
            if self.config.timing.prompt_cooldown_ms > 0 {
                self.delay.delay_ms(self.config.timing.prompt_cooldown_ms);
            }
        }

        let utterance = self.voice.listen();
        if utterance.is_empty() {
            warn!("No move recognized");
        }
        self.engine.submit_move(&utterance);
        self.stats.prompts = self.stats.prompts.wrapping_add(1);
        self.recalibrated = false;
    }
}
