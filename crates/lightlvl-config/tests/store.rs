use std::fs;

use lightlvl_config::{CONFIG_FILE_NAME, ConfigError, ConfigStore, LightConfig, LoadOutcome};
use lightlvl_geom::{BlockPos, MAX_RADIUS, ScanShape};
use lightlvl_rules::{Classifier, FixedBands, RuleDef};

#[test]
fn missing_file_is_written_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
    let (store, outcome) = ConfigStore::open(&path);
    assert_eq!(outcome, LoadOutcome::Missing);
    assert_eq!(store.config(), &LightConfig::default());
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("radius = 32"));
    assert!(written.contains("shape = \"sphere\""));
}

#[test]
fn malformed_file_is_replaced_by_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "radius = [not toml").unwrap();
    let (store, outcome) = ConfigStore::open(&path);
    assert!(matches!(outcome, LoadOutcome::Recovered(_)));
    assert_eq!(store.config(), &LightConfig::default());
    assert_eq!(LightConfig::load(&path).unwrap(), LightConfig::default());
}

#[test]
fn invalid_radius_leaves_config_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let (mut store, _) = ConfigStore::open(&path);
    assert_eq!(store.set_radius(10).unwrap(), 10);
    for bad in [0, -1, -500] {
        let err = store.set_radius(bad).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveRadius(r) if r == bad));
    }
    for huge in [i64::from(MAX_RADIUS) + 1, i64::from(i32::MAX), i64::from(u32::MAX)] {
        assert!(matches!(
            store.set_radius(huge),
            Err(ConfigError::RadiusTooLarge(r)) if r == huge
        ));
    }
    assert_eq!(store.config().radius, 10);
    assert_eq!(store.shared().load().radius, 10);
    assert_eq!(LightConfig::load(&path).unwrap().radius, 10);
}

#[test]
fn radius_cap_leaves_room_for_the_sphere_box() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let (mut store, _) = ConfigStore::open(&path);
    assert_eq!(store.set_radius(i64::from(MAX_RADIUS)).unwrap(), MAX_RADIUS);
    let settings = store.shared().load();
    let region = settings.region(BlockPos::ORIGIN);
    assert_eq!(region.extent(), MAX_RADIUS as i32 + 1);
    let (min, max) = region.bounds();
    assert!(min.x < max.x);
}

#[test]
fn mutations_republish_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let (mut store, _) = ConfigStore::open(&path);
    let shared = store.shared();

    assert!(store.toggle_color_contrast());
    assert_eq!(
        shared.load().classifier,
        Classifier::Fixed(FixedBands::new(true))
    );
    store.set_shape(ScanShape::Cube);
    assert_eq!(shared.load().shape, ScanShape::Cube);
    assert!(!store.toggle_color_contrast());
    assert_eq!(
        shared.load().classifier,
        Classifier::Fixed(FixedBands::new(false))
    );
}

#[test]
fn reload_picks_up_external_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let (mut store, _) = ConfigStore::open(&path);
    let shared = store.shared();

    let edited = LightConfig {
        radius: 7,
        rules: Some(RuleDef::example_set()),
        ..LightConfig::default()
    };
    edited.store(&path).unwrap();
    assert_eq!(store.reload(), LoadOutcome::Loaded);
    assert_eq!(store.config(), &edited);
    let s = shared.load();
    assert_eq!(s.radius, 7);
    assert!(s.classifier.is_rule_based());
}

#[test]
fn misconfigured_rules_survive_reload_but_are_not_evaluated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let mut defs = RuleDef::example_set();
    defs[2].light_type = "Torch".into();
    LightConfig {
        rules: Some(defs.clone()),
        ..LightConfig::default()
    }
    .store(&path)
    .unwrap();

    let (store, outcome) = ConfigStore::open(&path);
    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(store.config().rules.as_deref(), Some(&defs[..]));
    assert!(!store.shared().load().classifier.is_rule_based());
}

#[test]
fn own_writes_do_not_trigger_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let (mut store, _) = ConfigStore::open(&path);
    store.set_radius(5).unwrap();
    assert_eq!(store.reload_if_changed(), None);

    let edited = LightConfig {
        radius: 9,
        ..LightConfig::default()
    };
    edited.store(&path).unwrap();
    assert_eq!(store.reload_if_changed(), Some(LoadOutcome::Loaded));
    assert_eq!(store.config().radius, 9);
    assert_eq!(store.reload_if_changed(), None);
}
