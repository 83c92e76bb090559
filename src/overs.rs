//! Overs notation: a ball count displayed as `<completed overs>.<balls into the next over>`.
//!
//! 179 balls is 29 overs and 5 balls, shown as `29.5`. The fractional part only ever runs
//! from `.0` to `.5`, so the notation is not a decimal number of overs and must never be
//! averaged. Average ball counts, then convert.

use serde::{Serialize, Serializer};
use std::fmt;

pub const BALLS_PER_OVER: u32 = 6;

/// A count of legal deliveries, displayed in overs notation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Overs(u32);

impl Overs {
    pub const fn from_balls(balls: u32) -> Self {
        Self(balls)
    }

    pub const fn balls(self) -> u32 {
        self.0
    }

    pub const fn completed_overs(self) -> u32 {
        self.0 / BALLS_PER_OVER
    }

    pub const fn balls_into_over(self) -> u32 {
        self.0 % BALLS_PER_OVER
    }

    /// `floor(balls / 6) + (balls % 6) / 10`, as used for chart axes.
    pub fn notation(self) -> f64 {
        f64::from(self.completed_overs()) + f64::from(self.balls_into_over()) / 10.0
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.completed_overs(), self.balls_into_over())
    }
}

impl Serialize for Overs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.notation())
    }
}

impl From<u32> for Overs {
    fn from(balls: u32) -> Self {
        Self::from_balls(balls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_matches_integer_formula_for_every_ball_of_an_innings() {
        for balls in 0..=299u32 {
            let expected = (balls / 6) as f64 + (balls % 6) as f64 / 10.0;
            assert_eq!(Overs::from_balls(balls).notation(), expected, "balls = {}", balls);
        }
    }

    #[test]
    fn display_uses_overs_and_balls() {
        assert_eq!(Overs::from_balls(179).to_string(), "29.5");
        assert_eq!(Overs::from_balls(180).to_string(), "30.0");
        assert_eq!(Overs::from_balls(175).to_string(), "29.1");
        assert_eq!(Overs::from_balls(0).to_string(), "0.0");
        assert_eq!(Overs::from_balls(300).to_string(), "50.0");
    }

    #[test]
    fn notation_never_reaches_six_tenths() {
        for balls in 0..=299u32 {
            let frac = Overs::from_balls(balls).notation().fract();
            assert!(frac < 0.55, "balls = {} gave fraction {}", balls, frac);
        }
    }

    #[test]
    fn serializes_as_notation_number() {
        let json = serde_json::to_string(&Overs::from_balls(181)).unwrap();
        assert_eq!(json, "30.1");
    }
}
