//! Independent runs across a range of release rates.

use serde::Serialize;
use tracing::debug;

use crate::config::{ParameterOverrides, ParameterSet};
use crate::economics::UserEconomics;
use crate::engine::{simulate, SimulationError};
use crate::report::RunSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub release_rate: f64,
    pub final_saturation_pct: f64,
    pub summary: RunSummary,
    pub user_economics: UserEconomics,
}

/// One full run per rate, each built from `base` with only the release rate
/// replaced. Points come back in the order of `rates`.
pub fn sweep_release_rates(
    base: &ParameterOverrides,
    rates: &[f64],
    total_months: u32,
) -> Result<Vec<SweepPoint>, SimulationError> {
    rates
        .iter()
        .map(|&release_rate| -> Result<SweepPoint, SimulationError> {
            let params = ParameterSet::new(base.clone().overlay(ParameterOverrides {
                release_rate: Some(release_rate),
                ..Default::default()
            }))?;
            let result = simulate(&params, total_months)?;
            let final_saturation_pct = result
                .final_month()
                .map(|month| month.saturation_pct)
                .unwrap_or(0.0);
            debug!(release_rate, final_saturation_pct, "Sweep point computed");
            Ok(SweepPoint {
                release_rate,
                final_saturation_pct,
                summary: result.summary,
                user_economics: result.user_economics,
            })
        })
        .collect()
}
