//! Finishing options applied to hair before shipping.

use common::Money;
use serde::{Deserialize, Serialize};

/// How the strands are finished for application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ending {
    /// Loose hair, no assembly.
    #[default]
    None,
    Keratin,
    Tape,
    MicroRing,
    Weft,
}

impl Ending {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ending::None => "NONE",
            Ending::Keratin => "KERATIN",
            Ending::Tape => "TAPE",
            Ending::MicroRing => "MICRO_RING",
            Ending::Weft => "WEFT",
        }
    }
}

impl std::fmt::Display for Ending {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assembly fee per gram for each finishing option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyFeeSchedule {
    pub keratin: Money,
    pub tape: Money,
    pub micro_ring: Money,
    pub weft: Money,
}

impl AssemblyFeeSchedule {
    /// Fee for finishing `grams` of hair with `ending`, `None` on overflow.
    pub fn fee(&self, ending: Ending, grams: i64) -> Option<Money> {
        let per_gram = match ending {
            Ending::None => Money::zero(),
            Ending::Keratin => self.keratin,
            Ending::Tape => self.tape,
            Ending::MicroRing => self.micro_ring,
            Ending::Weft => self.weft,
        };
        per_gram.times(grams)
    }
}

impl Default for AssemblyFeeSchedule {
    fn default() -> Self {
        Self {
            keratin: Money::from_major(8),
            tape: Money::from_major(6),
            micro_ring: Money::from_major(7),
            weft: Money::from_major(4),
        }
    }
}
