//! Run-level results handed to presentation layers.

use serde::{Deserialize, Serialize};

use crate::catalog::TierTable;
use crate::economics::UserEconomics;
use crate::period::{round2, HealthFlag, MonthRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub months: Vec<MonthRecord>,
    pub user_economics: UserEconomics,
    pub reference_prices: TierTable<f64>,
    pub summary: RunSummary,
}

impl RunResult {
    /// Record for a 1-based month index.
    pub fn month(&self, month: u32) -> Option<&MonthRecord> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.months.get(index)
    }

    pub fn final_month(&self) -> Option<&MonthRecord> {
        self.months.last()
    }
}

/// Headline figures across the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_platform_revenue: f64,
    pub total_merit: f64,
    pub total_new_offspring: u64,
    pub peak_saturation_pct: f64,
    pub warning_months: usize,
    pub final_population: u64,
}

impl RunSummary {
    pub fn from_months(months: &[MonthRecord]) -> Self {
        let total_platform_revenue = months.iter().map(|m| m.platform_revenue.total).sum();
        let total_merit = months.iter().map(|m| m.merit).sum();
        Self {
            total_platform_revenue: round2(total_platform_revenue),
            total_merit: round2(total_merit),
            total_new_offspring: months
                .iter()
                .fold(0u64, |acc, m| acc.saturating_add(m.new_offspring)),
            peak_saturation_pct: months
                .iter()
                .map(|m| m.saturation_pct)
                .fold(0.0, f64::max),
            warning_months: months
                .iter()
                .filter(|m| m.health_flag == HealthFlag::InflationWarning)
                .count(),
            final_population: months.last().map(|m| m.population).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;
    use crate::period::PeriodCalculator;

    #[test]
    fn summary_accumulates_monthly_figures() {
        let params = ParameterSet::default();
        let calculator = PeriodCalculator::new(&params);
        let months = vec![
            calculator.calculate(300, 1).unwrap(),
            calculator.calculate(100, 2).unwrap(),
        ];
        let summary = RunSummary::from_months(&months);

        let expected_revenue = 485_220.0 + months[1].platform_revenue.total;
        assert!((summary.total_platform_revenue - expected_revenue).abs() < 1e-6);
        assert_eq!(summary.total_new_offspring, 9000 + 3000);
        assert!((summary.peak_saturation_pct - 180.0).abs() < 1e-9);
        // 100 breeders circulate 900 units: 60% of capacity.
        assert_eq!(summary.warning_months, 1);
        assert_eq!(summary.final_population, 100);
    }

    #[test]
    fn empty_history_summarises_to_zero() {
        let summary = RunSummary::from_months(&[]);
        assert_eq!(summary.total_new_offspring, 0);
        assert_eq!(summary.warning_months, 0);
        assert_eq!(summary.final_population, 0);
        assert_eq!(summary.total_merit, 0.0);
    }

    #[test]
    fn offspring_total_saturates_instead_of_wrapping() {
        let params = ParameterSet::default();
        let mut record = PeriodCalculator::new(&params).calculate(10, 1).unwrap();
        record.new_offspring = u64::MAX - 1;
        let summary = RunSummary::from_months(&[record.clone(), record]);
        assert_eq!(summary.total_new_offspring, u64::MAX);
    }
}
