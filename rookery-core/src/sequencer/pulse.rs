//! Per-tick pulse generation
//!
//! One tick emits at most one step per axis. Magnet ticks and translation
//! ticks never overlap; both translation axes may pulse in the same tick
//! since they are mechanically independent.

use super::machine::SequencerState;
use crate::config::{BoardConfig, MagnetMode};
use crate::motion::{Axis, Direction, PositionModel};
use crate::traits::{ActuatorLink, Delay, Line, LinkError};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// State the tick ran in
    pub state: SequencerState,
    /// Magnet step taken, if any
    pub magnet: Option<Direction>,
    /// File step taken, if any
    pub file: Option<Direction>,
    /// Rank step taken, if any
    pub rank: Option<Direction>,
}

impl TickReport {
    /// Check if the magnet moved this tick
    pub fn magnet_moved(&self) -> bool {
        self.magnet.is_some()
    }

    /// Check if the gantry moved this tick
    pub fn translated(&self) -> bool {
        self.file.is_some() || self.rank.is_some()
    }

    /// Check if anything moved this tick
    pub fn moved(&self) -> bool {
        self.magnet_moved() || self.translated()
    }
}

/// Actuator sequencer
///
/// Owns the sequencing state only; positions live in the
/// [`PositionModel`] and outputs go through the [`ActuatorLink`].
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    state: SequencerState,
    /// Last level written to each direction line (file, rank, magnet)
    dir_levels: [Option<bool>; 3],
}

impl Sequencer {
    /// Create an idle sequencer
    pub const fn new() -> Self {
        Self {
            state: SequencerState::Idle,
            dir_levels: [None; 3],
        }
    }

    /// Get the current state
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Check if the sequencer is idle
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Forget cached direction levels so the next step rewrites them
    pub fn reset(&mut self) {
        self.state = SequencerState::Idle;
        self.dir_levels = [None; 3];
    }

    /// Run one tick
    ///
    /// Picks the motion for this tick from the model, pulses, and settles
    /// back to `Idle` once the active motion is complete. Blocks for the
    /// pulse width or settle delay of whatever moved.
    pub fn tick<L, D>(
        &mut self,
        model: &mut PositionModel,
        config: &BoardConfig,
        link: &mut L,
        delay: &mut D,
    ) -> Result<TickReport, LinkError>
    where
        L: ActuatorLink,
        D: Delay,
    {
        let previous = self.state;
        self.state = self.state.transition(model);
        if self.state != previous {
            trace!("Sequencer: {:?} -> {:?}", previous, self.state);
        }

        let report = match self.state {
            SequencerState::Idle => TickReport::default(),
            SequencerState::MagnetMoving => self.pulse_magnet(model, config, link, delay)?,
            SequencerState::Translating => self.pulse_translation(model, config, link, delay)?,
        };

        let active = self.state;
        self.state = self.state.transition(model);
        if self.state != active {
            trace!("Sequencer: {:?} -> {:?}", active, self.state);
        }

        Ok(report)
    }

    fn pulse_magnet<L: ActuatorLink, D: Delay>(
        &mut self,
        model: &mut PositionModel,
        config: &BoardConfig,
        link: &mut L,
        delay: &mut D,
    ) -> Result<TickReport, LinkError> {
        let mut report = TickReport {
            state: SequencerState::MagnetMoving,
            ..Default::default()
        };

        match config.magnet.mode {
            MagnetMode::Stepped => {
                let Some(dir) = model.magnet.direction() else {
                    return Ok(report);
                };
                self.set_direction(link, Axis::Magnet, dir)?;
                link.set_high(Line::MagnetDrive)?;
                model.magnet.step();
                delay.delay_ms(config.magnet.pulse_ms);
                link.set_low(Line::MagnetDrive)?;
                report.magnet = Some(dir);
            }
            MagnetMode::Binary => {
                let dir = model.magnet.direction();
                let engage = model.magnet.target != 0;
                link.write(Line::MagnetDrive, engage)?;
                model.magnet.snap();
                debug!("Electromagnet {}", if engage { "on" } else { "off" });
                delay.delay_ms(config.magnet.settle_ms);
                report.magnet = dir;
            }
        }

        Ok(report)
    }

    fn pulse_translation<L: ActuatorLink, D: Delay>(
        &mut self,
        model: &mut PositionModel,
        config: &BoardConfig,
        link: &mut L,
        delay: &mut D,
    ) -> Result<TickReport, LinkError> {
        // Directions are fixed for the whole tick
        let file = model.file.direction();
        let rank = model.rank.direction();

        if let Some(dir) = file {
            self.set_direction(link, Axis::File, dir)?;
        }
        if let Some(dir) = rank {
            self.set_direction(link, Axis::Rank, dir)?;
        }

        let width_us = if model.magnet_engaged() {
            config.timing.pulse_us_engaged
        } else {
            config.timing.pulse_us_released
        };

        if file.is_some() {
            link.set_high(Line::FileStep)?;
            model.file.step();
        }
        if rank.is_some() {
            link.set_high(Line::RankStep)?;
            model.rank.step();
        }

        delay.delay_us(width_us);

        if file.is_some() {
            link.set_low(Line::FileStep)?;
        }
        if rank.is_some() {
            link.set_low(Line::RankStep)?;
        }

        Ok(TickReport {
            state: SequencerState::Translating,
            magnet: None,
            file,
            rank,
        })
    }

    fn set_direction<L: ActuatorLink>(
        &mut self,
        link: &mut L,
        axis: Axis,
        dir: Direction,
    ) -> Result<(), LinkError> {
        let (slot, line) = match axis {
            Axis::File => (0, Line::FileDir),
            Axis::Rank => (1, Line::RankDir),
            Axis::Magnet => (2, Line::MagnetDir),
        };
        let level = dir.line_level();
        if self.dir_levels[slot] != Some(level) {
            link.write(line, level)?;
            self.dir_levels[slot] = Some(level);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinePins, PinConfig};
    use crate::motion::{AxisPosition, CommandAdapter, MotionCommand};
    use crate::testing::{MockDelay, MockLink};
    use proptest::prelude::*;

    fn stepped_config() -> BoardConfig {
        let mut config = BoardConfig::default();
        config.magnet.mode = MagnetMode::Stepped;
        config.pins.magnet_dir = Some(LinePins::single(PinConfig::new(9)));
        config
    }

    fn run_to_idle(
        seq: &mut Sequencer,
        model: &mut PositionModel,
        config: &BoardConfig,
        link: &mut MockLink,
        delay: &mut MockDelay,
    ) -> u32 {
        let mut ticks = 0;
        loop {
            link.begin_tick();
            let report = seq.tick(model, config, link, delay).unwrap();
            assert!(
                !(link.tick_touched_magnet() && link.tick_touched_translation()),
                "magnet and translation lines written in the same tick"
            );
            if !report.moved() {
                break;
            }
            assert!(!(report.magnet_moved() && report.translated()));
            ticks += 1;
            assert!(ticks < 100_000, "sequencer failed to converge");
        }
        assert!(seq.is_idle());
        ticks
    }

    #[test]
    fn test_idle_tick_writes_nothing() {
        let mut seq = Sequencer::new();
        let mut model = PositionModel::new();
        let mut link = MockLink::new();
        let mut delay = MockDelay::new();

        let report = seq
            .tick(&mut model, &BoardConfig::default(), &mut link, &mut delay)
            .unwrap();
        assert_eq!(report, TickReport::default());
        assert_eq!(link.writes, 0);
        assert_eq!(delay.total_us, 0);
    }

    #[test]
    fn test_diagonal_scenario_pulse_counts() {
        let config = BoardConfig::default();
        let mut model = PositionModel::new();
        CommandAdapter::new()
            .apply(MotionCommand::ShiftFileAndRank(1.0, -1.0), &mut model, &config, true)
            .unwrap();
        assert_eq!((model.file.target, model.rank.target), (222, -222));

        let mut seq = Sequencer::new();
        let mut link = MockLink::new();
        let mut delay = MockDelay::new();
        let ticks = run_to_idle(&mut seq, &mut model, &config, &mut link, &mut delay);

        assert_eq!(ticks, 222);
        assert_eq!(link.pulses(Line::FileStep), 222);
        assert_eq!(link.pulses(Line::RankStep), 222);
        assert_eq!(link.forward_pulses(Line::FileStep), 222);
        assert_eq!(link.forward_pulses(Line::RankStep), 0);
        assert_eq!(link.pulses(Line::MagnetDrive), 0);
        assert_eq!(model.file, AxisPosition::at(222));
        assert_eq!(model.rank, AxisPosition::at(-222));
        // Released pulse width for every tick
        assert_eq!(delay.total_us, 222 * u64::from(config.timing.pulse_us_released));
        // Direction lines are written once, not per pulse
        assert_eq!(link.writes_to(Line::FileDir), 1);
        assert_eq!(link.writes_to(Line::RankDir), 1);
    }

    #[test]
    fn test_stepped_magnet_resolves_before_translation() {
        let config = stepped_config();
        let mut model = PositionModel::new();
        model.magnet.target = 30;
        model.file.target = 5;

        let mut seq = Sequencer::new();
        let mut link = MockLink::new();
        let mut delay = MockDelay::new();

        for _ in 0..30 {
            let report = seq.tick(&mut model, &config, &mut link, &mut delay).unwrap();
            assert_eq!(report.state, SequencerState::MagnetMoving);
            assert_eq!(report.magnet, Some(Direction::Forward));
            assert!(!report.translated());
        }
        assert_eq!(model.magnet, AxisPosition::at(30));
        assert_eq!(model.file.current, 0);
        assert!(seq.is_idle());

        let report = seq.tick(&mut model, &config, &mut link, &mut delay).unwrap();
        assert_eq!(report.state, SequencerState::Translating);
        assert_eq!(report.file, Some(Direction::Forward));
        // Magnet engaged, so the long pulse width applies
        assert_eq!(
            delay.total_us,
            30 * 20_000 + u64::from(config.timing.pulse_us_engaged)
        );
    }

    #[test]
    fn test_binary_magnet_snaps_with_settle_delay() {
        let config = BoardConfig::default();
        assert_eq!(config.magnet.mode, MagnetMode::Binary);
        let mut model = PositionModel::new();
        model.magnet.target = 1;

        let mut seq = Sequencer::new();
        let mut link = MockLink::new();
        let mut delay = MockDelay::new();

        let report = seq.tick(&mut model, &config, &mut link, &mut delay).unwrap();
        assert_eq!(report.magnet, Some(Direction::Forward));
        assert!(link.level(Line::MagnetDrive));
        assert!(model.magnet.is_at_target());
        assert!(seq.is_idle());
        assert_eq!(delay.total_us, 2_000_000);

        model.magnet.target = 0;
        let report = seq.tick(&mut model, &config, &mut link, &mut delay).unwrap();
        assert_eq!(report.magnet, Some(Direction::Reverse));
        assert!(!link.level(Line::MagnetDrive));
    }

    #[test]
    fn test_magnet_request_deferred_during_translation() {
        let config = BoardConfig::default();
        let mut model = PositionModel::new();
        model.rank.target = 3;

        let mut seq = Sequencer::new();
        let mut link = MockLink::new();
        let mut delay = MockDelay::new();

        seq.tick(&mut model, &config, &mut link, &mut delay).unwrap();
        assert_eq!(seq.state(), SequencerState::Translating);

        model.magnet.target = 30;
        for _ in 0..2 {
            let report = seq.tick(&mut model, &config, &mut link, &mut delay).unwrap();
            assert_eq!(report.state, SequencerState::Translating);
            assert!(!report.magnet_moved());
        }
        assert!(seq.is_idle());
        assert_eq!(model.rank.current, 3);

        let report = seq.tick(&mut model, &config, &mut link, &mut delay).unwrap();
        assert_eq!(report.state, SequencerState::MagnetMoving);
    }

    #[test]
    fn test_uneven_axes_finish_independently() {
        let config = BoardConfig::default();
        let mut model = PositionModel::new();
        model.file.target = 2;
        model.rank.target = -5;

        let mut seq = Sequencer::new();
        let mut link = MockLink::new();
        let mut delay = MockDelay::new();
        let ticks = run_to_idle(&mut seq, &mut model, &config, &mut link, &mut delay);

        assert_eq!(ticks, 5);
        assert_eq!(link.pulses(Line::FileStep), 2);
        assert_eq!(link.pulses(Line::RankStep), 5);
    }

    #[test]
    fn test_link_failure_propagates() {
        let config = BoardConfig::default();
        let mut model = PositionModel::new();
        model.file.target = 1;

        let mut seq = Sequencer::new();
        let mut link = MockLink::new();
        link.fail_on = Some(Line::FileStep);
        let mut delay = MockDelay::new();

        assert_eq!(
            seq.tick(&mut model, &config, &mut link, &mut delay),
            Err(LinkError::PinRejected(Line::FileStep))
        );
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        File(i8),
        Rank(i8),
        Magnet(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-4i8..=4).prop_map(Op::File),
            (-4i8..=4).prop_map(Op::Rank),
            any::<bool>().prop_map(Op::Magnet),
        ]
    }

    proptest! {
        #[test]
        fn prop_commands_converge_without_overlap(ops in proptest::collection::vec(op(), 1..12)) {
            let mut config = stepped_config();
            config.file.unit_step = 7;
            config.rank.unit_step = 5;
            config.magnet.unit_turn = 3;
            let adapter = CommandAdapter::new();
            let mut model = PositionModel::new();
            let mut seq = Sequencer::new();
            let mut link = MockLink::new();
            let mut delay = MockDelay::new();

            let mut expected_file = 0i32;
            let mut expected_rank = 0i32;
            for op in ops {
                let command = match op {
                    Op::File(d) => {
                        expected_file += i32::from(d) * 7;
                        MotionCommand::ShiftFile(f32::from(d))
                    }
                    Op::Rank(d) => {
                        expected_rank += i32::from(d) * 5;
                        MotionCommand::ShiftRank(f32::from(d))
                    }
                    Op::Magnet(on) => MotionCommand::ToggleMagnet(i32::from(on)),
                };
                adapter.apply(command, &mut model, &config, true).unwrap();
                run_to_idle(&mut seq, &mut model, &config, &mut link, &mut delay);
                prop_assert!(model.is_at_rest());
            }
            prop_assert_eq!(model.file.current, expected_file);
            prop_assert_eq!(model.rank.current, expected_rank);
        }

        #[test]
        fn prop_diagonal_matches_separate_shifts(a in -30.0f32..30.0, b in -30.0f32..30.0) {
            let config = BoardConfig::default();
            let adapter = CommandAdapter::new();

            let mut combined = PositionModel::new();
            adapter.apply(MotionCommand::ShiftFileAndRank(a, b), &mut combined, &config, true).unwrap();
            let mut seq = Sequencer::new();
            run_to_idle(&mut seq, &mut combined, &config, &mut MockLink::new(), &mut MockDelay::new());

            let mut separate = PositionModel::new();
            let mut seq = Sequencer::new();
            adapter.apply(MotionCommand::ShiftFile(a), &mut separate, &config, true).unwrap();
            run_to_idle(&mut seq, &mut separate, &config, &mut MockLink::new(), &mut MockDelay::new());
            adapter.apply(MotionCommand::ShiftRank(b), &mut separate, &config, true).unwrap();
            run_to_idle(&mut seq, &mut separate, &config, &mut MockLink::new(), &mut MockDelay::new());

            prop_assert_eq!(
                (combined.file.current, combined.rank.current),
                (separate.file.current, separate.rank.current)
            );
        }
    }
}
