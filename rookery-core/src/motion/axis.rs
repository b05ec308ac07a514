//! Axis position model

/// Physical axis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// File coordinate (columns a..h)
    File,
    /// Rank coordinate (rows 1..8)
    Rank,
    /// Magnet angle or electromagnet state
    Magnet,
}

impl Axis {
    /// All axes
    pub const ALL: [Axis; 3] = [Axis::File, Axis::Rank, Axis::Magnet];
}

/// Step direction along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward increasing positions
    Forward,
    /// Toward decreasing positions
    Reverse,
}

impl Direction {
    /// Direction that moves `from` toward `to`, or `None` if equal
    pub fn toward(from: i32, to: i32) -> Option<Self> {
        match to.cmp(&from) {
            core::cmp::Ordering::Greater => Some(Direction::Forward),
            core::cmp::Ordering::Less => Some(Direction::Reverse),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Level of the direction line for this direction
    pub fn line_level(self) -> bool {
        matches!(self, Direction::Forward)
    }

    /// Signed unit step
    pub fn unit(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Current and target position of one axis, in step units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisPosition {
    /// Where the axis is
    pub current: i32,
    /// Where the axis is headed
    pub target: i32,
}

impl AxisPosition {
    /// Create an axis at rest at `position`
    pub const fn at(position: i32) -> Self {
        Self {
            current: position,
            target: position,
        }
    }

    /// Check if the axis has reached its target
    pub fn is_at_target(&self) -> bool {
        self.current == self.target
    }

    /// Signed steps still to go
    pub fn remaining(&self) -> i32 {
        self.target - self.current
    }

    /// Direction of the next step, or `None` at target
    pub fn direction(&self) -> Option<Direction> {
        Direction::toward(self.current, self.target)
    }

    /// Advance one unit toward the target
    ///
    /// Returns the direction stepped, or `None` if already at target.
    pub fn step(&mut self) -> Option<Direction> {
        let dir = self.direction()?;
        self.current += dir.unit();
        Some(dir)
    }

    /// Jump straight to the target (binary magnets)
    pub fn snap(&mut self) {
        self.current = self.target;
    }
}

/// Positions of all three axes
///
/// Owned exclusively by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionModel {
    pub file: AxisPosition,
    pub rank: AxisPosition,
    pub magnet: AxisPosition,
}

impl PositionModel {
    /// All axes at rest at the origin
    pub const fn new() -> Self {
        Self {
            file: AxisPosition::at(0),
            rank: AxisPosition::at(0),
            magnet: AxisPosition::at(0),
        }
    }

    /// Get an axis
    pub fn get(&self, axis: Axis) -> &AxisPosition {
        match axis {
            Axis::File => &self.file,
            Axis::Rank => &self.rank,
            Axis::Magnet => &self.magnet,
        }
    }

    /// Get an axis mutably
    pub fn get_mut(&mut self, axis: Axis) -> &mut AxisPosition {
        match axis {
            Axis::File => &mut self.file,
            Axis::Rank => &mut self.rank,
            Axis::Magnet => &mut self.magnet,
        }
    }

    /// Check if every axis is at its target
    pub fn is_at_rest(&self) -> bool {
        self.file.is_at_target() && self.rank.is_at_target() && self.magnet.is_at_target()
    }

    /// Check if the magnet still has to move
    pub fn magnet_pending(&self) -> bool {
        !self.magnet.is_at_target()
    }

    /// Check if file or rank still has to move
    pub fn translation_pending(&self) -> bool {
        !self.file.is_at_target() || !self.rank.is_at_target()
    }

    /// Check if the magnet is currently holding a piece
    pub fn magnet_engaged(&self) -> bool {
        self.magnet.current != 0
    }

    /// Declare the current file/rank position to be the origin
    ///
    /// Used after homing against the corner stops. The magnet axis is left
    /// untouched.
    pub fn rezero_translation(&mut self) {
        self.file = AxisPosition::at(0);
        self.rank = AxisPosition::at(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_toward() {
        assert_eq!(Direction::toward(0, 5), Some(Direction::Forward));
        assert_eq!(Direction::toward(5, 0), Some(Direction::Reverse));
        assert_eq!(Direction::toward(3, 3), None);
        assert_eq!(Direction::Forward.opposite(), Direction::Reverse);
        assert!(Direction::Forward.line_level());
        assert!(!Direction::Reverse.line_level());
    }

    #[test]
    fn test_axis_steps_to_target() {
        let mut axis = AxisPosition { current: 0, target: -3 };
        assert_eq!(axis.remaining(), -3);

        let mut steps = 0;
        while let Some(dir) = axis.step() {
            assert_eq!(dir, Direction::Reverse);
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(axis.is_at_target());
        assert_eq!(axis.current, -3);
        assert_eq!(axis.step(), None);
    }

    #[test]
    fn test_axis_snap() {
        let mut axis = AxisPosition { current: 0, target: 1 };
        axis.snap();
        assert!(axis.is_at_target());
        assert_eq!(axis.current, 1);
    }

    #[test]
    fn test_model_pending_flags() {
        let mut model = PositionModel::new();
        assert!(model.is_at_rest());
        assert!(!model.magnet_engaged());

        model.magnet.target = 30;
        assert!(model.magnet_pending());
        assert!(!model.translation_pending());
        assert!(!model.is_at_rest());

        model.magnet.snap();
        model.rank.target = 10;
        assert!(model.magnet_engaged());
        assert!(model.translation_pending());
        assert_eq!(model.get(Axis::Rank).remaining(), 10);
    }

    #[test]
    fn test_rezero_keeps_magnet() {
        let mut model = PositionModel::new();
        model.file = AxisPosition::at(-11_100);
        model.rank = AxisPosition::at(-11_100);
        model.magnet = AxisPosition::at(1);

        model.rezero_translation();
        assert_eq!(model.file, AxisPosition::at(0));
        assert_eq!(model.rank, AxisPosition::at(0));
        assert_eq!(model.magnet, AxisPosition::at(1));
    }
}
