use std::iter;

use tracing::{debug, info, warn};

use crate::config::{ConfigError, ParameterSet};
use crate::economics::UserEconomics;
use crate::period::{HealthFlag, MonthRecord, PeriodCalculator};
use crate::report::{RunResult, RunSummary};

pub const DEFAULT_MONTHS: u32 = 6;
/// Breeders never decay below this count.
pub const POPULATION_FLOOR: u64 = 10;
const DECAY_NUMERATOR: u128 = 7;
const DECAY_DENOMINATOR: u128 = 10;

/// Next month's breeder count: 70% of the previous month, floored, never
/// below [`POPULATION_FLOOR`].
pub fn decay_population(previous: u64) -> u64 {
    let decayed = u128::from(previous) * DECAY_NUMERATOR / DECAY_DENOMINATOR;
    // 70% of a u64 always fits back into a u64.
    u64::try_from(decayed).unwrap_or(u64::MAX).max(POPULATION_FLOOR)
}

/// Population for months 1, 2, 3, ... starting from `initial`.
pub fn population_schedule(initial: u64) -> impl Iterator<Item = u64> {
    iter::successors(Some(initial), |previous| Some(decay_population(*previous)))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("a run needs at least one month")]
    NoMonths,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub scenario_name: String,
    pub total_months: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scenario_name: "default".to_string(),
            total_months: DEFAULT_MONTHS,
        }
    }
}

pub struct Engine {
    params: ParameterSet,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(params: ParameterSet, settings: EngineSettings) -> Self {
        Self { params, settings }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn run(&self) -> Result<RunResult, SimulationError> {
        self.run_with_hook(|_| {})
    }

    /// Runs every month in order, handing each record to `hook` as soon as it
    /// is produced. A failing month aborts the run and no history is returned.
    pub fn run_with_hook<F>(&self, mut hook: F) -> Result<RunResult, SimulationError>
    where
        F: FnMut(&MonthRecord),
    {
        let total_months = self.settings.total_months;
        if total_months == 0 {
            return Err(SimulationError::NoMonths);
        }
        let scenario = self.settings.scenario_name.as_str();
        let calculator = PeriodCalculator::new(&self.params);

        let months = (1..=total_months)
            .zip(population_schedule(self.params.initial_population()))
            .map(|(month, population)| -> Result<MonthRecord, ConfigError> {
                let record = calculator.calculate(population, month)?;
                debug!(
                    scenario,
                    month,
                    population,
                    total_circulation = record.total_circulation,
                    saturation_pct = record.saturation_pct,
                    "Month computed"
                );
                if record.health_flag == HealthFlag::InflationWarning {
                    warn!(
                        scenario,
                        month,
                        saturation_pct = record.saturation_pct,
                        "Circulation exceeds market capacity"
                    );
                }
                hook(&record);
                Ok(record)
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let last = months.last().ok_or(SimulationError::NoMonths)?;
        let user_economics =
            UserEconomics::derive(&self.params, &last.net_circulation, last.population)?;
        let summary = RunSummary::from_months(&months);
        info!(
            scenario,
            months = total_months,
            final_population = summary.final_population,
            total_platform_revenue = summary.total_platform_revenue,
            total_merit = summary.total_merit,
            profit_rate_pct = user_economics.profit_rate_pct,
            "Simulation completed"
        );

        Ok(RunResult {
            months,
            user_economics,
            reference_prices: self.params.market_prices().clone(),
            summary,
        })
    }
}

pub fn simulate(params: &ParameterSet, total_months: u32) -> Result<RunResult, SimulationError> {
    let settings = EngineSettings {
        total_months,
        ..EngineSettings::default()
    };
    Engine::new(params.clone(), settings).run()
}
