/// Player intents for a single tick.
///
/// The input producer edge-detects key presses and collapses repeated presses within one tick
/// into a single flag. In the game-over state `move_right` doubles as the restart intent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::struct_excessive_bools)]
pub struct Intents {
    pub move_left: bool,
    pub move_right: bool,
    pub rotate: bool,
    pub soft_drop: bool,
}

impl Intents {
    pub const NONE: Self = Self {
        move_left: false,
        move_right: false,
        rotate: false,
        soft_drop: false,
    };

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.move_left || self.move_right || self.rotate || self.soft_drop)
    }

    /// Whether these intents restart a finished game.
    #[must_use]
    pub const fn is_restart(&self) -> bool {
        self.move_right
    }

    /// Combines two snapshots; a flag is set when set in either.
    #[must_use]
    pub const fn merged(self, other: Self) -> Self {
        Self {
            move_left: self.move_left || other.move_left,
            move_right: self.move_right || other.move_right,
            rotate: self.rotate || other.rotate,
            soft_drop: self.soft_drop || other.soft_drop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_merge() {
        assert!(Intents::NONE.is_empty());
        assert_eq!(Intents::default(), Intents::NONE);

        let left = Intents {
            move_left: true,
            ..Intents::NONE
        };
        let rotate = Intents {
            rotate: true,
            ..Intents::NONE
        };
        let merged = left.merged(rotate);
        assert!(!merged.is_empty());
        assert!(merged.move_left && merged.rotate);
        assert!(!merged.move_right && !merged.soft_drop);
        assert_eq!(merged.merged(left), merged);
    }
}
