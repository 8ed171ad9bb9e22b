use serde::{Deserialize, Serialize};

/// Speed parameters of a game.
///
/// All speeds are fixed point in milli-rows per tick: [`GameRules::ONE_ROW`] (1000) is one
/// full unit. Every tick the fall accumulator gains the current fall speed and the rotation
/// accumulator gains `rotation_speed`; an accumulator reaching `ONE_ROW` fires.
///
/// The defaults reproduce the classic pacing at 60 ticks per second: a piece falls one row
/// every 50 ticks at the start, and rotation becomes ready again 4 ticks after a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameRules {
    /// Fall speed at game start and after a restart.
    pub initial_fall_speed: u32,
    /// Added to the fall speed once per lock that cleared at least one row.
    pub fall_speed_increment: u32,
    /// Upper bound of the fall speed.
    pub max_fall_speed: u32,
    /// Rotation cooldown speed.
    pub rotation_speed: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl GameRules {
    /// One full unit of an accumulator.
    pub const ONE_ROW: u32 = 1000;

    pub const DEFAULT: Self = Self {
        initial_fall_speed: 20,
        fall_speed_increment: 5,
        max_fall_speed: Self::ONE_ROW,
        rotation_speed: 250,
    };

    /// Returns these rules with a different initial fall speed, capped at the maximum.
    #[must_use]
    pub const fn with_initial_fall_speed(self, speed: u32) -> Self {
        let initial_fall_speed = if speed > self.max_fall_speed {
            self.max_fall_speed
        } else {
            speed
        };
        Self {
            initial_fall_speed,
            ..self
        }
    }

    /// Fall speed after one more clearing lock.
    #[must_use]
    pub const fn next_fall_speed(&self, current: u32) -> u32 {
        let next = current.saturating_add(self.fall_speed_increment);
        if next > self.max_fall_speed {
            self.max_fall_speed
        } else {
            next
        }
    }
}

const _: () = {
    assert!(GameRules::DEFAULT.initial_fall_speed <= GameRules::DEFAULT.max_fall_speed);
    assert!(GameRules::DEFAULT.max_fall_speed <= GameRules::ONE_ROW);
    assert!(GameRules::DEFAULT.rotation_speed > 0);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fall_speed_is_capped() {
        let rules = GameRules::DEFAULT;
        assert_eq!(rules.next_fall_speed(20), 25);
        assert_eq!(rules.next_fall_speed(998), 1000);
        assert_eq!(rules.next_fall_speed(1000), 1000);
        assert_eq!(rules.with_initial_fall_speed(5000).initial_fall_speed, 1000);
        assert_eq!(rules.with_initial_fall_speed(100).initial_fall_speed, 100);
    }

    #[test]
    fn test_rules_serialization() {
        let json = serde_json::to_string(&GameRules::DEFAULT).unwrap();
        assert_eq!(
            json,
            r#"{"initial_fall_speed":20,"fall_speed_increment":5,"max_fall_speed":1000,"rotation_speed":250}"#
        );
        let rules: GameRules = serde_json::from_str(&json).unwrap();
        assert_eq!(rules, GameRules::DEFAULT);
    }
}
