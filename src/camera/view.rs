//! Orientation of the displayed stream.

use serde::Serialize;
use std::fmt;

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    fn clockwise(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }
}

/// Flip/rotate state applied when displaying the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewTransform {
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub rotation: Rotation,
}

impl ViewTransform {
    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }

    pub fn rotate_clockwise(&mut self) {
        self.rotation = self.rotation.clockwise();
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for ViewTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rotate {}°", self.rotation.degrees())?;
        if self.flip_horizontal {
            write!(f, ", flip horizontal")?;
        }
        if self.flip_vertical {
            write!(f, ", flip vertical")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_rotations_return_to_identity() {
        let mut view = ViewTransform::default();
        for _ in 0..4 {
            view.rotate_clockwise();
        }
        assert!(view.is_identity());
    }

    #[test]
    fn test_display() {
        let mut view = ViewTransform::default();
        view.rotate_clockwise();
        view.toggle_flip_horizontal();
        assert_eq!(view.to_string(), "rotate 90°, flip horizontal");
    }
}
