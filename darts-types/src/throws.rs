use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::errors::ThrowParseError;

/// Base value of the bullseye ring (outer bull single, inner bull double).
pub const BULLSEYE: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Multiplier {
    Single,
    Double,
    Triple,
}

impl Multiplier {
    pub fn factor(self) -> u32 {
        match self {
            Multiplier::Single => 1,
            Multiplier::Double => 2,
            Multiplier::Triple => 3,
        }
    }
}

/// One dart as entered by the scorer.
///
/// `Bust` is the sentinel the scorer presses to end a countdown turn on the
/// bust path; it never carries points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoredThrow {
    Hit { base: u8, multiplier: Multiplier },
    Bust,
}

impl ScoredThrow {
    pub fn hit(base: u8, multiplier: Multiplier) -> Self {
        ScoredThrow::Hit { base, multiplier }
    }

    pub fn single(base: u8) -> Self {
        Self::hit(base, Multiplier::Single)
    }

    pub fn double(base: u8) -> Self {
        Self::hit(base, Multiplier::Double)
    }

    pub fn triple(base: u8) -> Self {
        Self::hit(base, Multiplier::Triple)
    }

    pub fn miss() -> Self {
        Self::single(0)
    }

    pub fn outer_bull() -> Self {
        Self::single(BULLSEYE)
    }

    pub fn inner_bull() -> Self {
        Self::double(BULLSEYE)
    }

    pub fn total(&self) -> u32 {
        match self {
            ScoredThrow::Hit { base, multiplier } => *base as u32 * multiplier.factor(),
            ScoredThrow::Bust => 0,
        }
    }

    pub fn base(&self) -> Option<u8> {
        match self {
            ScoredThrow::Hit { base, .. } => Some(*base),
            ScoredThrow::Bust => None,
        }
    }

    pub fn multiplier(&self) -> Option<Multiplier> {
        match self {
            ScoredThrow::Hit { multiplier, .. } => Some(*multiplier),
            ScoredThrow::Bust => None,
        }
    }

    pub fn is_bust(&self) -> bool {
        matches!(self, ScoredThrow::Bust)
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, ScoredThrow::Hit { base: 0, .. })
    }

    /// Doubles ring or inner bull. A doubled miss is still a miss.
    pub fn is_double(&self) -> bool {
        matches!(self, ScoredThrow::Hit { base, multiplier: Multiplier::Double } if *base > 0)
    }

    pub fn is_triple(&self) -> bool {
        matches!(self, ScoredThrow::Hit { base, multiplier: Multiplier::Triple } if *base > 0)
    }

    pub fn is_bullseye(&self) -> bool {
        self.base() == Some(BULLSEYE)
    }

    /// True when the dart landed in any segment of `number`.
    pub fn hits_number(&self, number: u8) -> bool {
        number > 0 && self.base() == Some(number)
    }
}

impl fmt::Display for ScoredThrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoredThrow::Bust => write!(f, "BUST"),
            ScoredThrow::Hit { base: 0, .. } => write!(f, "MISS"),
            ScoredThrow::Hit { base: BULLSEYE, multiplier: Multiplier::Double } => write!(f, "BULL"),
            ScoredThrow::Hit { base, multiplier: Multiplier::Single } => write!(f, "{}", base),
            ScoredThrow::Hit { base, multiplier: Multiplier::Double } => write!(f, "D{}", base),
            ScoredThrow::Hit { base, multiplier: Multiplier::Triple } => write!(f, "T{}", base),
        }
    }
}

impl FromStr for ScoredThrow {
    type Err = ThrowParseError;

    /// Parses scorer notation: `T20`, `D16`, `S5` or `5`, `25`, `BULL`/`DB`,
    /// `M`/`MISS`/`0`, `X`/`BUST`. Case-insensitive.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let token = input.trim().to_uppercase();
        let invalid = || ThrowParseError::Invalid {
            input: input.trim().to_string(),
        };

        match token.as_str() {
            "" => return Err(invalid()),
            "X" | "BUST" => return Ok(ScoredThrow::Bust),
            "M" | "MISS" | "0" => return Ok(ScoredThrow::miss()),
            "BULL" | "DB" | "D25" | "50" => return Ok(ScoredThrow::inner_bull()),
            "SB" | "OB" => return Ok(ScoredThrow::outer_bull()),
            _ => {}
        }

        let (multiplier, digits) = match token.chars().next() {
            Some('S') => (Multiplier::Single, &token[1..]),
            Some('D') => (Multiplier::Double, &token[1..]),
            Some('T') => (Multiplier::Triple, &token[1..]),
            _ => (Multiplier::Single, token.as_str()),
        };

        let base: u8 = digits.parse().map_err(|_| invalid())?;
        match (base, multiplier) {
            (BULLSEYE, Multiplier::Triple) => Err(ThrowParseError::TripleBull),
            (1..=20, _) | (BULLSEYE, _) => Ok(ScoredThrow::hit(base, multiplier)),
            _ => Err(ThrowParseError::OffBoard { base }),
        }
    }
}

/// Parses a whitespace-separated visit such as `"T20 T20 D20"`.
pub fn parse_visit(input: &str) -> Result<Vec<ScoredThrow>, ThrowParseError> {
    input.split_whitespace().map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        assert_eq!(ScoredThrow::triple(20).total(), 60);
        assert_eq!(ScoredThrow::double(16).total(), 32);
        assert_eq!(ScoredThrow::inner_bull().total(), 50);
        assert_eq!(ScoredThrow::outer_bull().total(), 25);
        assert_eq!(ScoredThrow::miss().total(), 0);
        // Sentinel scores nothing regardless of how it was produced
        assert_eq!(ScoredThrow::Bust.total(), 0);
    }

    #[test]
    fn test_parse_notation() {
        assert_eq!("T20".parse::<ScoredThrow>().unwrap(), ScoredThrow::triple(20));
        assert_eq!("d16".parse::<ScoredThrow>().unwrap(), ScoredThrow::double(16));
        assert_eq!("S5".parse::<ScoredThrow>().unwrap(), ScoredThrow::single(5));
        assert_eq!("19".parse::<ScoredThrow>().unwrap(), ScoredThrow::single(19));
        assert_eq!("25".parse::<ScoredThrow>().unwrap(), ScoredThrow::outer_bull());
        assert_eq!("bull".parse::<ScoredThrow>().unwrap(), ScoredThrow::inner_bull());
        assert_eq!("M".parse::<ScoredThrow>().unwrap(), ScoredThrow::miss());
        assert_eq!("x".parse::<ScoredThrow>().unwrap(), ScoredThrow::Bust);
    }

    #[test]
    fn test_parse_rejects_illegal_darts() {
        assert_eq!("T25".parse::<ScoredThrow>(), Err(ThrowParseError::TripleBull));
        assert_eq!(
            "21".parse::<ScoredThrow>(),
            Err(ThrowParseError::OffBoard { base: 21 })
        );
        assert!("D0".parse::<ScoredThrow>().is_err());
        assert!("Q7".parse::<ScoredThrow>().is_err());
        assert!("".parse::<ScoredThrow>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for token in ["T20", "D16", "7", "25", "BULL", "MISS", "BUST"] {
            let dart: ScoredThrow = token.parse().unwrap();
            assert_eq!(dart.to_string(), token);
        }
    }

    #[test]
    fn test_ring_predicates() {
        assert!(ScoredThrow::inner_bull().is_double());
        assert!(ScoredThrow::inner_bull().is_bullseye());
        assert!(!ScoredThrow::double(0).is_double());
        assert!(ScoredThrow::triple(19).is_triple());
        assert!(ScoredThrow::triple(19).hits_number(19));
        assert!(!ScoredThrow::miss().hits_number(0));
        assert!(!ScoredThrow::Bust.hits_number(20));
    }

    #[test]
    fn test_parse_visit() {
        let visit = parse_visit("T20 T20  D20").unwrap();
        assert_eq!(visit.iter().map(|d| d.total()).sum::<u32>(), 160);
        assert!(parse_visit("T20 T21").is_err());
    }
}
