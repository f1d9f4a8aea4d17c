use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tianchi::{
    economics::consumable_spend,
    engine::Engine,
    scenario::{Scenario, ScenarioLoader},
    sweep::sweep_release_rates,
    ParameterOverrides, RunResult,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Breeder marketplace economics runner")]
struct Cli {
    /// Path to a scenario YAML file (built-in defaults when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override month count (uses scenario value, then 6, when omitted)
    #[arg(long)]
    months: Option<u32>,

    /// Override the fraction of offspring released each month
    #[arg(long)]
    release_rate: Option<f64>,

    /// Override the transaction fee rate on offspring sales
    #[arg(long)]
    fee_rate: Option<f64>,

    /// Override the breeder count in month 1
    #[arg(long)]
    initial_population: Option<u64>,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Compare independent runs at these release rates, e.g. 0.5,0.6,0.7
    #[arg(long, value_delimiter = ',')]
    sweep: Vec<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::default(),
    };
    init_tracing(&scenario.logging.level);

    let overrides = ParameterOverrides {
        release_rate: cli.release_rate,
        fee_rate: cli.fee_rate,
        initial_population: cli.initial_population,
        ..Default::default()
    };
    let months = scenario.months(cli.months);

    if !cli.sweep.is_empty() {
        let base = scenario.parameters.clone().overlay(overrides);
        let points = sweep_release_rates(&base, &cli.sweep, months)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&points)?);
        } else {
            println!("release  final_sat%  revenue        merit          profit_rate%");
            for point in &points {
                println!(
                    "{:<8.2} {:>10.2}  {:>13.2}  {:>13.2}  {:>12.2}",
                    point.release_rate,
                    point.final_saturation_pct,
                    point.summary.total_platform_revenue,
                    point.summary.total_merit,
                    point.user_economics.profit_rate_pct
                );
            }
        }
        return Ok(());
    }

    let params = scenario
        .parameters(overrides)
        .with_context(|| format!("Invalid parameters in scenario '{}'", scenario.name))?;
    info!(
        scenario = scenario.name.as_str(),
        months,
        release_rate = params.release_rate(),
        initial_population = params.initial_population(),
        "Parameters loaded"
    );

    let engine = Engine::new(params, scenario.engine_settings(cli.months));
    let result = engine.run()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&engine, &result, scenario.description.as_deref())?;
    }
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(engine: &Engine, result: &RunResult, description: Option<&str>) -> Result<()> {
    let params = engine.params();
    println!(
        "Scenario '{}': {} months, release rate {:.0}%, fee rate {:.1}%",
        engine.settings().scenario_name,
        result.months.len(),
        params.release_rate() * 100.0,
        params.fee_rate() * 100.0
    );
    if let Some(description) = description {
        println!("{}", description.trim());
    }
    println!("month  population  circulation  saturation%      revenue        merit  health");
    for month in &result.months {
        println!(
            "{:>5}  {:>10}  {:>11}  {:>11.2}  {:>11.2}  {:>11.2}  {}",
            month.month,
            month.population,
            month.total_circulation,
            month.saturation_pct,
            month.platform_revenue.total,
            month.merit,
            month.health_flag
        );
    }

    if let Some(first) = result.month(1) {
        println!("=== First month ===");
        println!("Market saturation: {:.2}%", first.saturation_pct);
    }
    let user = &result.user_economics;
    println!("User profit rate: {:.2}%", user.profit_rate_pct);
    println!(
        "User profit: theoretical max {:.2}, actual {:.2} (cost basis {:.2})",
        user.theoretical_max_profit, user.actual_net_profit, user.base_cost
    );

    let spend = consumable_spend(params)?
        .into_iter()
        .map(|(item, cost)| format!("{item} {cost:.2}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("Consumables per breeder: {spend}");

    let summary = &result.summary;
    println!(
        "Totals: platform revenue {:.2}, merit {:.2}, new offspring {}, warning months {}",
        summary.total_platform_revenue,
        summary.total_merit,
        summary.total_new_offspring,
        summary.warning_months
    );
    Ok(())
}
