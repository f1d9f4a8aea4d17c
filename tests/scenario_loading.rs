use std::path::PathBuf;

use tianchi::{
    engine::Engine, scenario::ScenarioLoader, ConfigError, ParameterOverrides, ParameterSet, Tier,
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn scenario_path() -> PathBuf {
    PathBuf::from("scenarios/baseline.yaml")
}

#[test]
fn scenario_loader_reads_fixture() {
    let scenario = scenario_loader().load(scenario_path()).expect("scenario parses");
    assert_eq!(scenario.name, "baseline");
    assert_eq!(scenario.months(None), 6);
    assert_eq!(
        scenario.description.as_deref(),
        Some("Default marketplace tables with 300 breeders at launch.")
    );
    let params = scenario
        .parameters(ParameterOverrides::default())
        .expect("fixture is valid");
    // The fixture spells out the built-in defaults.
    assert_eq!(params, ParameterSet::default());
}

#[test]
fn locale_option_names_load_from_file() {
    let scenario = scenario_loader()
        .load("scenarios/gentle_release.yaml")
        .expect("scenario parses");
    assert_eq!(scenario.months(None), 12);
    assert_eq!(scenario.logging.level, "debug");
    let params = scenario
        .parameters(ParameterOverrides::default())
        .expect("fixture is valid");
    assert_eq!(params.release_rate(), 0.4);
    assert_eq!(params.initial_population(), 800);
    assert_eq!(params.market_capacity(), 6400.0);
    assert_eq!(params.market_price(Tier::Epic).unwrap(), 300.0);
}

#[test]
fn engine_runs_deterministically() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    let params = scenario.parameters(ParameterOverrides::default()).unwrap();

    let engine_a = Engine::new(params.clone(), scenario.engine_settings(Some(24)));
    let engine_b = Engine::new(params, scenario.engine_settings(Some(24)));
    let result_a = engine_a.run().unwrap();
    let result_b = engine_b.run().unwrap();

    assert_eq!(result_a.months, result_b.months);
    assert_eq!(result_a, result_b);
}

#[test]
fn scenario_written_to_disk_round_trips_through_loader() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("custom.yaml");
    std::fs::write(
        &path,
        "name: custom\nmonths: 3\nparameters:\n  fee_rate: 0.1\n  production_table:\n    common: 4\n    rare: 3\n    legendary: 2\n    epic: 1\n",
    )
    .unwrap();

    let scenario = ScenarioLoader::new(temp_dir.path()).load("custom.yaml").unwrap();
    let params = scenario.parameters(ParameterOverrides::default()).unwrap();
    assert_eq!(params.fee_rate(), 0.1);
    assert_eq!(params.yield_per_breeder(Tier::Common).unwrap(), 4);

    let result = Engine::new(params, scenario.engine_settings(None)).run().unwrap();
    assert_eq!(result.months.len(), 3);
    // 300 breeders * (4 + 3 + 2 + 1) offspring.
    assert_eq!(result.months[0].new_offspring, 3000);
}

#[test]
fn incomplete_table_in_file_is_a_config_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("partial.yaml"),
        "name: partial\nparameters:\n  market_price_table:\n    普通: 50\n    稀有: 100\n",
    )
    .unwrap();

    let scenario = ScenarioLoader::new(temp_dir.path()).load("partial.yaml").unwrap();
    let err = scenario
        .parameters(ParameterOverrides::default())
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingKey {
            table: "market_price_table",
            key: "传说".into()
        }
    );
}

#[test]
fn loader_reports_missing_and_malformed_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let loader = ScenarioLoader::new(temp_dir.path());

    let err = loader.load("absent.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read scenario file"));

    std::fs::write(
        temp_dir.path().join("typo.yaml"),
        "name: typo\nparameters:\n  releese_rate: 0.5\n",
    )
    .unwrap();
    let err = loader.load("typo.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}
