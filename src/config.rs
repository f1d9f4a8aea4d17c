use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Consumable, ConsumableTable, Tier, TierTable};
use crate::engine::POPULATION_FLOOR;

pub const DEFAULT_UNIT_PRICE: f64 = 1000.0;
pub const DEFAULT_RELEASE_RATE: f64 = 0.7;
pub const DEFAULT_FEE_RATE: f64 = 0.03;
pub const DEFAULT_INITIAL_POPULATION: u64 = 300;
pub const DEFAULT_MARKET_CAPACITY_FACTOR: f64 = 5.0;

fn default_market_prices() -> TierTable<f64> {
    [
        (Tier::Common, 50.0),
        (Tier::Rare, 100.0),
        (Tier::Legendary, 200.0),
        (Tier::Epic, 300.0),
    ]
    .into_iter()
    .collect()
}

fn default_production() -> TierTable<u64> {
    [
        (Tier::Common, 12),
        (Tier::Rare, 9),
        (Tier::Legendary, 6),
        (Tier::Epic, 3),
    ]
    .into_iter()
    .collect()
}

fn default_item_costs() -> ConsumableTable<f64> {
    [
        (Consumable::MatchPill, 10.0),
        (Consumable::Feed, 5.0),
        (Consumable::Herb, 50.0),
    ]
    .into_iter()
    .collect()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{table} has no entry for '{key}'")]
    MissingKey { table: &'static str, key: String },

    #[error("{field} must lie in [0, 1], got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be a finite, non-negative price, got {value}")]
    InvalidPrice { field: String, value: f64 },

    #[error("unit_price must be positive, got {0}")]
    NonPositiveUnitPrice(f64),

    #[error("initial_population must be greater than zero")]
    EmptyPopulation,

    #[error("market_capacity_factor must be at least 1, got {0}")]
    CapacityFactorTooSmall(f64),

    #[error("offspring of {population} breeders overflow the unit counter")]
    ProductionOverflow { population: u64 },
}

/// Partial parameter mapping as it appears in scenario files and on the
/// command line. Absent fields keep their defaults; a supplied table replaces
/// the default table wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterOverrides {
    #[serde(alias = "至尊价格", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(alias = "市场价表", skip_serializing_if = "Option::is_none")]
    pub market_price_table: Option<TierTable<f64>>,
    #[serde(alias = "产量表", skip_serializing_if = "Option::is_none")]
    pub production_table: Option<TierTable<u64>>,
    #[serde(alias = "道具成本", skip_serializing_if = "Option::is_none")]
    pub item_cost_table: Option<ConsumableTable<f64>>,
    #[serde(alias = "放生率", skip_serializing_if = "Option::is_none")]
    pub release_rate: Option<f64>,
    #[serde(alias = "手续费率", skip_serializing_if = "Option::is_none")]
    pub fee_rate: Option<f64>,
    #[serde(alias = "初始至尊数量", skip_serializing_if = "Option::is_none")]
    pub initial_population: Option<u64>,
    #[serde(alias = "市场容量系数", skip_serializing_if = "Option::is_none")]
    pub market_capacity_factor: Option<f64>,
}

impl ParameterOverrides {
    /// Layers `other` on top of `self`. Only fields set in `other` win.
    pub fn overlay(self, other: ParameterOverrides) -> Self {
        Self {
            unit_price: other.unit_price.or(self.unit_price),
            market_price_table: other.market_price_table.or(self.market_price_table),
            production_table: other.production_table.or(self.production_table),
            item_cost_table: other.item_cost_table.or(self.item_cost_table),
            release_rate: other.release_rate.or(self.release_rate),
            fee_rate: other.fee_rate.or(self.fee_rate),
            initial_population: other.initial_population.or(self.initial_population),
            market_capacity_factor: other.market_capacity_factor.or(self.market_capacity_factor),
        }
    }
}

/// Validated, immutable model parameters. The only way to obtain one is
/// [`ParameterSet::new`] (or [`Default`], which yields the same values as
/// `new` with no overrides).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    unit_price: f64,
    market_price_table: TierTable<f64>,
    production_table: TierTable<u64>,
    item_cost_table: ConsumableTable<f64>,
    release_rate: f64,
    fee_rate: f64,
    initial_population: u64,
    market_capacity_factor: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            unit_price: DEFAULT_UNIT_PRICE,
            market_price_table: default_market_prices(),
            production_table: default_production(),
            item_cost_table: default_item_costs(),
            release_rate: DEFAULT_RELEASE_RATE,
            fee_rate: DEFAULT_FEE_RATE,
            initial_population: DEFAULT_INITIAL_POPULATION,
            market_capacity_factor: DEFAULT_MARKET_CAPACITY_FACTOR,
        }
    }
}

impl TryFrom<ParameterOverrides> for ParameterSet {
    type Error = ConfigError;

    fn try_from(overrides: ParameterOverrides) -> Result<Self, Self::Error> {
        Self::new(overrides)
    }
}

impl ParameterSet {
    pub fn new(overrides: ParameterOverrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let params = Self {
            unit_price: overrides.unit_price.unwrap_or(defaults.unit_price),
            market_price_table: overrides
                .market_price_table
                .unwrap_or(defaults.market_price_table),
            production_table: overrides
                .production_table
                .unwrap_or(defaults.production_table),
            item_cost_table: overrides.item_cost_table.unwrap_or(defaults.item_cost_table),
            release_rate: overrides.release_rate.unwrap_or(defaults.release_rate),
            fee_rate: overrides.fee_rate.unwrap_or(defaults.fee_rate),
            initial_population: overrides
                .initial_population
                .unwrap_or(defaults.initial_population),
            market_capacity_factor: overrides
                .market_capacity_factor
                .unwrap_or(defaults.market_capacity_factor),
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.unit_price.is_finite() || self.unit_price <= 0.0 {
            return Err(ConfigError::NonPositiveUnitPrice(self.unit_price));
        }

        require_keys(&self.market_price_table, "market_price_table", &Tier::ALL)?;
        for (tier, price) in &self.market_price_table {
            check_price(|| format!("market_price_table[{tier}]"), *price)?;
        }
        require_keys(&self.production_table, "production_table", &Tier::ALL)?;
        self.offspring_per_breeder()?;

        require_keys(&self.item_cost_table, "item_cost_table", &Consumable::ALL)?;
        for (item, cost) in &self.item_cost_table {
            check_price(|| format!("item_cost_table[{item}]"), *cost)?;
        }

        check_rate("release_rate", self.release_rate)?;
        check_rate("fee_rate", self.fee_rate)?;

        if self.initial_population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        // Decay never raises a population above the larger of these two.
        let peak = self.initial_population.max(POPULATION_FLOOR);
        self.offspring_per_breeder()?
            .checked_mul(peak)
            .ok_or(ConfigError::ProductionOverflow {
                population: self.initial_population,
            })?;
        let factor = self.market_capacity_factor;
        if !factor.is_finite() || factor < 1.0 {
            return Err(ConfigError::CapacityFactorTooSmall(
                self.market_capacity_factor,
            ));
        }
        Ok(())
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn release_rate(&self) -> f64 {
        self.release_rate
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }

    pub fn initial_population(&self) -> u64 {
        self.initial_population
    }

    pub fn market_capacity_factor(&self) -> f64 {
        self.market_capacity_factor
    }

    /// Circulating units the market absorbs before saturation exceeds 100%.
    pub fn market_capacity(&self) -> f64 {
        self.initial_population as f64 * self.market_capacity_factor
    }

    pub fn market_prices(&self) -> &TierTable<f64> {
        &self.market_price_table
    }

    pub fn production(&self) -> &TierTable<u64> {
        &self.production_table
    }

    pub fn item_costs(&self) -> &ConsumableTable<f64> {
        &self.item_cost_table
    }

    pub fn market_price(&self, tier: Tier) -> Result<f64, ConfigError> {
        lookup(&self.market_price_table, "market_price_table", tier)
    }

    pub fn yield_per_breeder(&self, tier: Tier) -> Result<u64, ConfigError> {
        lookup(&self.production_table, "production_table", tier)
    }

    pub fn item_cost(&self, item: Consumable) -> Result<f64, ConfigError> {
        lookup(&self.item_cost_table, "item_cost_table", item)
    }

    /// Offspring of a single breeder over one month, across every tier.
    pub fn offspring_per_breeder(&self) -> Result<u64, ConfigError> {
        self.production_table
            .values()
            .try_fold(0u64, |acc, units| acc.checked_add(*units))
            .ok_or(ConfigError::ProductionOverflow { population: 1 })
    }

    /// Consumable spend for a single breeder over one month.
    pub fn item_cost_per_breeder(&self) -> Result<f64, ConfigError> {
        Consumable::ALL.iter().try_fold(0.0, |acc, item| -> Result<f64, ConfigError> {
            Ok(acc + item.per_breeder_units() as f64 * self.item_cost(*item)?)
        })
    }
}

fn lookup<K, V>(table: &BTreeMap<K, V>, name: &'static str, key: K) -> Result<V, ConfigError>
where
    K: Ord + fmt::Display,
    V: Copy,
{
    table
        .get(&key)
        .copied()
        .ok_or_else(|| ConfigError::MissingKey {
            table: name,
            key: key.to_string(),
        })
}

fn require_keys<K, V>(table: &BTreeMap<K, V>, name: &'static str, keys: &[K]) -> Result<(), ConfigError>
where
    K: Ord + fmt::Display,
{
    match keys.iter().find(|key| !table.contains_key(key)) {
        Some(missing) => Err(ConfigError::MissingKey {
            table: name,
            key: missing.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_rate(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { field, value })
    }
}

fn check_price(field: impl FnOnce() -> String, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidPrice {
            field: field(),
            value,
        })
    }
}
