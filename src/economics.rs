use serde::{Deserialize, Serialize};

use crate::catalog::{Consumable, Tier, TierTable};
use crate::config::{ConfigError, ParameterSet};
use crate::period::round2;

/// Expected economics for one user holding a single breeder, measured
/// against the realized circulation of the final simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEconomics {
    /// Breeder price plus one month of consumables.
    pub base_cost: f64,
    /// Sales value of a full, unreleased month of offspring.
    pub theoretical_sales: f64,
    pub per_user_circulation: TierTable<u64>,
    pub actual_sales: f64,
    pub theoretical_max_profit: f64,
    pub actual_net_profit: f64,
    pub profit_rate_pct: f64,
}

impl UserEconomics {
    pub fn derive(
        params: &ParameterSet,
        final_net_circulation: &TierTable<u64>,
        final_population: u64,
    ) -> Result<Self, ConfigError> {
        let base_cost = params.unit_price() + params.item_cost_per_breeder()?;

        let mut theoretical_sales = 0.0;
        let mut actual_sales = 0.0;
        let mut per_user_circulation = TierTable::new();
        for tier in Tier::ALL {
            let price = params.market_price(tier)?;
            theoretical_sales += params.yield_per_breeder(tier)? as f64 * price;

            let circulating = final_net_circulation.get(&tier).copied().ok_or_else(|| {
                ConfigError::MissingKey {
                    table: "net_circulation",
                    key: tier.to_string(),
                }
            })?;
            let share = circulating.checked_div(final_population).unwrap_or(0);
            actual_sales += share as f64 * price;
            per_user_circulation.insert(tier, share);
        }

        let keep = 1.0 - params.fee_rate();
        let actual_net_profit = actual_sales * keep - base_cost;

        Ok(Self {
            base_cost: round2(base_cost),
            theoretical_sales: round2(theoretical_sales),
            per_user_circulation,
            actual_sales: round2(actual_sales),
            theoretical_max_profit: round2(theoretical_sales * keep - base_cost),
            actual_net_profit: round2(actual_net_profit),
            profit_rate_pct: round2(actual_net_profit / params.unit_price() * 100.0),
        })
    }
}

/// Cost of the breeding-cycle consumables a single user buys, split per item.
pub fn consumable_spend(params: &ParameterSet) -> Result<Vec<(Consumable, f64)>, ConfigError> {
    Consumable::ALL
        .iter()
        .map(|item| -> Result<(Consumable, f64), ConfigError> {
            Ok((*item, item.per_breeder_units() as f64 * params.item_cost(*item)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterOverrides;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn circulation(values: [u64; 4]) -> TierTable<u64> {
        Tier::ALL.into_iter().zip(values).collect()
    }

    #[test]
    fn default_parameters_after_six_months() {
        let params = ParameterSet::default();
        // Month six of the default run: 49 breeders.
        let economics =
            UserEconomics::derive(&params, &circulation([176, 132, 88, 44]), 49).unwrap();

        assert!(approx(economics.base_cost, 1585.0));
        assert!(approx(economics.theoretical_sales, 3600.0));
        assert_eq!(
            economics.per_user_circulation,
            circulation([3, 2, 1, 0])
        );
        assert!(approx(economics.actual_sales, 550.0));
        assert!(approx(economics.theoretical_max_profit, 1907.0));
        assert!(approx(economics.actual_net_profit, -1051.5));
        assert!(approx(economics.profit_rate_pct, -105.15));
    }

    #[test]
    fn zero_population_yields_no_per_user_sales() {
        let params = ParameterSet::default();
        let economics = UserEconomics::derive(&params, &circulation([10, 10, 10, 10]), 0).unwrap();
        assert!(economics.per_user_circulation.values().all(|share| *share == 0));
        assert!(approx(economics.actual_sales, 0.0));
        assert!(approx(economics.actual_net_profit, -1585.0));
    }

    #[test]
    fn fees_reduce_both_profit_figures() {
        let free = ParameterSet::new(ParameterOverrides {
            fee_rate: Some(0.0),
            ..Default::default()
        })
        .unwrap();
        let taxed = ParameterSet::new(ParameterOverrides {
            fee_rate: Some(0.5),
            ..Default::default()
        })
        .unwrap();
        let net = circulation([360, 270, 180, 90]);
        let free = UserEconomics::derive(&free, &net, 30).unwrap();
        let taxed = UserEconomics::derive(&taxed, &net, 30).unwrap();
        assert!(approx(free.actual_sales, 3600.0));
        assert!(approx(free.actual_net_profit, 2015.0));
        assert!(approx(taxed.actual_net_profit, 215.0));
        assert!(taxed.theoretical_max_profit < free.theoretical_max_profit);
    }

    #[test]
    fn profit_rate_uses_unrounded_profit() {
        let params = ParameterSet::new(ParameterOverrides {
            unit_price: Some(1.0),
            fee_rate: Some(0.0333),
            ..Default::default()
        })
        .unwrap();
        // One common offspring per user: 50 * 0.9667 - 586 = -537.665.
        let economics =
            UserEconomics::derive(&params, &circulation([1, 0, 0, 0]), 1).unwrap();
        assert!(approx(economics.actual_net_profit, -537.67));
        assert!(approx(economics.profit_rate_pct, -53766.5));
    }

    #[test]
    fn missing_circulation_tier_is_reported() {
        let params = ParameterSet::default();
        let mut net = circulation([1, 1, 1, 1]);
        net.remove(&Tier::Epic);
        let err = UserEconomics::derive(&params, &net, 1).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingKey {
                table: "net_circulation",
                key: "史诗".into()
            }
        );
    }

    #[test]
    fn consumable_spend_sums_to_item_cost_per_breeder() {
        let params = ParameterSet::default();
        let spend = consumable_spend(&params).unwrap();
        assert_eq!(
            spend,
            vec![
                (Consumable::MatchPill, 300.0),
                (Consumable::Feed, 185.0),
                (Consumable::Herb, 100.0)
            ]
        );
        let total: f64 = spend.iter().map(|(_, cost)| cost).sum();
        assert!(approx(total, params.item_cost_per_breeder().unwrap()));
    }
}
