//! Offspring tiers and breeding consumables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Offspring grade. Ordering follows rarity, which is also the display order
/// of every tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "普通", alias = "common")]
    Common,
    #[serde(rename = "稀有", alias = "rare")]
    Rare,
    #[serde(rename = "传说", alias = "legendary")]
    Legendary,
    #[serde(rename = "史诗", alias = "epic")]
    Epic,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Common, Tier::Rare, Tier::Legendary, Tier::Epic];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Common => "普通",
            Tier::Rare => "稀有",
            Tier::Legendary => "传说",
            Tier::Epic => "史诗",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Item bought and burned every breeding cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Consumable {
    #[serde(rename = "姻缘丹", alias = "match_pill")]
    MatchPill,
    #[serde(rename = "饲料", alias = "feed")]
    Feed,
    #[serde(rename = "仙草", alias = "herb")]
    Herb,
}

impl Consumable {
    pub const ALL: [Consumable; 3] = [Consumable::MatchPill, Consumable::Feed, Consumable::Herb];

    pub fn label(self) -> &'static str {
        match self {
            Consumable::MatchPill => "姻缘丹",
            Consumable::Feed => "饲料",
            Consumable::Herb => "仙草",
        }
    }

    /// Units one breeder consumes per month.
    pub fn per_breeder_units(self) -> u64 {
        match self {
            Consumable::MatchPill => 30,
            Consumable::Feed => 37,
            Consumable::Herb => 2,
        }
    }
}

impl fmt::Display for Consumable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub type TierTable<V> = BTreeMap<Tier, V>;
pub type ConsumableTable<V> = BTreeMap<Consumable, V>;
