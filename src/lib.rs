pub mod catalog;
pub mod config;
pub mod economics;
pub mod engine;
pub mod period;
pub mod report;
pub mod scenario;
pub mod sweep;

pub use catalog::{Consumable, Tier};
pub use config::{ConfigError, ParameterOverrides, ParameterSet};
pub use economics::UserEconomics;
pub use engine::{simulate, Engine, EngineSettings, SimulationError};
pub use period::{HealthFlag, MonthRecord, PeriodCalculator, PlatformRevenue};
pub use report::{RunResult, RunSummary};
