//! Single-month economics: production, circulation, platform revenue, merit
//! and market saturation for a given breeder population.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Consumable, Tier, TierTable};
use crate::config::{ConfigError, ParameterSet};

/// Share of destroyed offspring value credited as merit.
const RELEASE_MERIT_WEIGHT: f64 = 0.5;
/// Share of the per-cycle breeding spend credited as merit.
const BREEDING_MERIT_WEIGHT: f64 = 0.3;

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthFlag {
    Normal,
    InflationWarning,
}

impl HealthFlag {
    pub fn from_saturation(saturation_pct: f64) -> Self {
        if saturation_pct > 100.0 {
            HealthFlag::InflationWarning
        } else {
            HealthFlag::Normal
        }
    }
}

impl fmt::Display for HealthFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthFlag::Normal => f.write_str("normal"),
            HealthFlag::InflationWarning => f.write_str("inflation warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRevenue {
    pub unit_sales: f64,
    pub item_sales: f64,
    pub transaction_fees: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub month: u32,
    pub population: u64,
    pub gross_production: TierTable<u64>,
    pub net_circulation: TierTable<u64>,
    pub new_offspring: u64,
    pub total_circulation: u64,
    pub platform_revenue: PlatformRevenue,
    pub merit: f64,
    pub market_capacity: f64,
    pub saturation_pct: f64,
    pub health_flag: HealthFlag,
}

/// Computes one month's snapshot. Holds no state between calls; the only
/// link between months is the population the caller passes in.
#[derive(Debug, Clone, Copy)]
pub struct PeriodCalculator<'a> {
    params: &'a ParameterSet,
}

impl<'a> PeriodCalculator<'a> {
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// `month` is only echoed into the record.
    pub fn calculate(&self, population: u64, month: u32) -> Result<MonthRecord, ConfigError> {
        let params = self.params;
        let kept_fraction = 1.0 - params.release_rate();

        let mut gross_production = TierTable::new();
        let mut net_circulation = TierTable::new();
        let mut circulating_value = 0.0;
        let mut released_value = 0.0;
        for tier in Tier::ALL {
            let price = params.market_price(tier)?;
            let gross = params
                .yield_per_breeder(tier)?
                .checked_mul(population)
                .ok_or(ConfigError::ProductionOverflow { population })?;
            // Truncate toward zero: whole units only, never above gross.
            let net = ((gross as f64 * kept_fraction) as u64).min(gross);
            circulating_value += net as f64 * price;
            released_value += (gross - net) as f64 * price;
            gross_production.insert(tier, gross);
            net_circulation.insert(tier, net);
        }
        let new_offspring = gross_production
            .values()
            .try_fold(0u64, |acc, units| acc.checked_add(*units))
            .ok_or(ConfigError::ProductionOverflow { population })?;
        // Bounded by new_offspring.
        let total_circulation = net_circulation.values().sum();

        let unit_sales = population as f64 * params.unit_price();
        let item_sales = population as f64 * params.item_cost_per_breeder()?;
        let transaction_fees = circulating_value * params.fee_rate();
        let platform_revenue = PlatformRevenue {
            unit_sales: round2(unit_sales),
            item_sales: round2(item_sales),
            transaction_fees: round2(transaction_fees),
            total: round2(unit_sales + item_sales + transaction_fees),
        };

        let release_merit = released_value * RELEASE_MERIT_WEIGHT;
        let merit = round2(release_merit + self.breeding_merit()?);

        let market_capacity = params.market_capacity();
        let saturation_pct = round2(total_circulation as f64 / market_capacity * 100.0);

        Ok(MonthRecord {
            month,
            population,
            gross_production,
            net_circulation,
            new_offspring,
            total_circulation,
            platform_revenue,
            merit,
            market_capacity,
            saturation_pct,
            health_flag: HealthFlag::from_saturation(saturation_pct),
        })
    }

    /// Flat per-cycle bonus. Only match pills and herbs count; feed does not.
    pub fn breeding_merit(&self) -> Result<f64, ConfigError> {
        let pills = Consumable::MatchPill.per_breeder_units() as f64
            * self.params.item_cost(Consumable::MatchPill)?;
        let herbs =
            Consumable::Herb.per_breeder_units() as f64 * self.params.item_cost(Consumable::Herb)?;
        Ok((pills + herbs) * BREEDING_MERIT_WEIGHT)
    }
}
