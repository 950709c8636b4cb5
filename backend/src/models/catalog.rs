//! Static drink catalog and loyalty tiers
//!
//! Prep time and complexity are fixed properties of a drink type; they never
//! vary per order. Complexity is derived from prep time:
//! `max(0, 100 - (prep - 1) * 20)`.
//!
//! | Drink      | Prep (min) | Complexity | Arrival weight |
//! |------------|-----------:|-----------:|---------------:|
//! | Cold Brew  | 1          | 100        | 25             |
//! | Espresso   | 2          | 80         | 20             |
//! | Americano  | 2          | 80         | 15             |
//! | Cappuccino | 4          | 40         | 20             |
//! | Latte      | 4          | 40         | 12             |
//! | Mocha      | 6          | 0          | 8              |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised by the strict `FromStr` parsers
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Unknown drink type: {0}")]
    UnknownDrink(String),

    #[error("Unknown loyalty tier: {0}")]
    UnknownLoyalty(String),
}

/// Drink types on the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrinkType {
    ColdBrew,
    Espresso,
    Americano,
    Cappuccino,
    Latte,
    Mocha,
}

impl DrinkType {
    /// Catalog order; also the index order of `ARRIVAL_WEIGHTS`
    pub const ALL: [DrinkType; 6] = [
        DrinkType::ColdBrew,
        DrinkType::Espresso,
        DrinkType::Americano,
        DrinkType::Cappuccino,
        DrinkType::Latte,
        DrinkType::Mocha,
    ];

    /// Relative arrival frequency of each catalog entry
    pub const ARRIVAL_WEIGHTS: [u32; 6] = [25, 20, 15, 20, 12, 8];

    /// Fixed preparation time in minutes
    pub fn prep_time_minutes(self) -> u32 {
        match self {
            DrinkType::ColdBrew => 1,
            DrinkType::Espresso | DrinkType::Americano => 2,
            DrinkType::Cappuccino | DrinkType::Latte => 4,
            DrinkType::Mocha => 6,
        }
    }

    /// Complexity score in [0, 100]; short drinks score high
    ///
    /// # Example
    /// ```
    /// use barista_dispatch_core_rs::DrinkType;
    ///
    /// assert_eq!(DrinkType::ColdBrew.complexity_score(), 100);
    /// assert_eq!(DrinkType::Espresso.complexity_score(), 80);
    /// assert_eq!(DrinkType::Mocha.complexity_score(), 0);
    /// ```
    pub fn complexity_score(self) -> u32 {
        100u32.saturating_sub((self.prep_time_minutes() - 1) * 20)
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            DrinkType::ColdBrew => "Cold Brew",
            DrinkType::Espresso => "Espresso",
            DrinkType::Americano => "Americano",
            DrinkType::Cappuccino => "Cappuccino",
            DrinkType::Latte => "Latte",
            DrinkType::Mocha => "Mocha",
        }
    }

    /// Lenient parse used at the order-intake boundary
    ///
    /// Unrecognized input falls back to Cold Brew (shortest prep, highest
    /// complexity score) instead of rejecting the order.
    ///
    /// # Example
    /// ```
    /// use barista_dispatch_core_rs::DrinkType;
    ///
    /// assert_eq!(DrinkType::parse_or_default("latte"), DrinkType::Latte);
    /// assert_eq!(DrinkType::parse_or_default("COLD_BREW"), DrinkType::ColdBrew);
    /// assert_eq!(DrinkType::parse_or_default("flat white"), DrinkType::ColdBrew);
    /// ```
    pub fn parse_or_default(input: &str) -> DrinkType {
        input.parse().unwrap_or(DrinkType::ColdBrew)
    }
}

impl FromStr for DrinkType {
    type Err = CatalogError;

    /// Case-insensitive; spaces, underscores and dashes are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "coldbrew" => Ok(DrinkType::ColdBrew),
            "espresso" => Ok(DrinkType::Espresso),
            "americano" => Ok(DrinkType::Americano),
            "cappuccino" => Ok(DrinkType::Cappuccino),
            "latte" => Ok(DrinkType::Latte),
            "mocha" => Ok(DrinkType::Mocha),
            _ => Err(CatalogError::UnknownDrink(s.to_string())),
        }
    }
}

impl fmt::Display for DrinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Customer loyalty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoyaltyTier {
    #[default]
    Regular,
    Gold,
}

impl LoyaltyTier {
    /// Raw priority boost before the scoring cap is applied
    pub fn boost(self) -> u32 {
        match self {
            LoyaltyTier::Regular => 0,
            LoyaltyTier::Gold => 15,
        }
    }

    /// Lenient parse; anything but "gold" is Regular
    pub fn parse_or_default(input: &str) -> LoyaltyTier {
        input.parse().unwrap_or_default()
    }
}

impl FromStr for LoyaltyTier {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(LoyaltyTier::Regular),
            "gold" => Ok(LoyaltyTier::Gold),
            _ => Err(CatalogError::UnknownLoyalty(s.to_string())),
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoyaltyTier::Regular => f.write_str("Regular"),
            LoyaltyTier::Gold => f.write_str("Gold"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_table() {
        let expected = [(1, 100), (2, 80), (2, 80), (4, 40), (4, 40), (6, 0)];
        for (drink, (prep, complexity)) in DrinkType::ALL.iter().zip(expected) {
            assert_eq!(drink.prep_time_minutes(), prep, "{}", drink);
            assert_eq!(drink.complexity_score(), complexity, "{}", drink);
        }
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!(
            "flat white".parse::<DrinkType>(),
            Err(CatalogError::UnknownDrink("flat white".to_string()))
        );
        assert!("platinum".parse::<LoyaltyTier>().is_err());
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("Cold Brew".parse::<DrinkType>(), Ok(DrinkType::ColdBrew));
        assert_eq!("cold-brew".parse::<DrinkType>(), Ok(DrinkType::ColdBrew));
        assert_eq!("CAPPUCCINO".parse::<DrinkType>(), Ok(DrinkType::Cappuccino));
        assert_eq!(LoyaltyTier::parse_or_default(" GOLD "), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::parse_or_default("vip"), LoyaltyTier::Regular);
    }

    #[test]
    fn test_loyalty_boosts() {
        assert_eq!(LoyaltyTier::Regular.boost(), 0);
        assert_eq!(LoyaltyTier::Gold.boost(), 15);
    }
}
