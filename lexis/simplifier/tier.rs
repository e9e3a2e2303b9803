use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simplification strength selecting the active word map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Strongest simplification (advanced to elementary corpus).
    #[default]
    Beginner,
    /// Moderate simplification (advanced to intermediate corpus).
    Intermediate,
    /// Pass-through.
    Advanced,
}

impl Tier {
    /// Every tier.
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Advanced text is returned untouched.
    #[must_use]
    pub const fn is_passthrough(self) -> bool {
        matches!(self, Self::Advanced)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier name that matches no tier or alias.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown tier `{0}` (expected beginner, intermediate, advanced, adv-ele, or adv-int)")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" | "adv-ele" => Ok(Self::Beginner),
            "intermediate" | "adv-int" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(UnknownTier(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_corpus_aliases() {
        assert_eq!("Beginner".parse::<Tier>(), Ok(Tier::Beginner));
        assert_eq!("ADV-INT".parse::<Tier>(), Ok(Tier::Intermediate));
        assert_eq!(" advanced ".parse::<Tier>(), Ok(Tier::Advanced));
        assert_eq!(
            "expert".parse::<Tier>(),
            Err(UnknownTier("expert".to_string()))
        );
    }

    #[test]
    fn only_advanced_passes_through() {
        let passthrough: Vec<Tier> = Tier::ALL
            .into_iter()
            .filter(|tier| tier.is_passthrough())
            .collect();
        assert_eq!(passthrough, vec![Tier::Advanced]);
    }
}
