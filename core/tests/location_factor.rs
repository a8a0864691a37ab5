use std::cell::Cell;
use valuation_core::{
    calculator::{ValuationCalculator, ValuationResult},
    config::AppConfig,
    error::{CalcResult, ValuationError},
    location::{LocationFactor, LocationFactorSource, LocationTable},
    parameters::GlobalParameters,
    property::Property,
    store::ValuationStore,
};

/// Wraps a table and counts how often it is asked.
struct CountingSource {
    table: LocationTable,
    calls: Cell<usize>,
}

impl LocationFactorSource for CountingSource {
    fn latest_factor(&self, city: &str, postal_code: Option<&str>) -> CalcResult<Option<f64>> {
        self.calls.set(self.calls.get() + 1);
        self.table.latest_factor(city, postal_code)
    }
}

/// A lookup that is always down.
struct BrokenSource;

impl LocationFactorSource for BrokenSource {
    fn latest_factor(&self, _city: &str, _postal_code: Option<&str>) -> CalcResult<Option<f64>> {
        Err(ValuationError::Other(anyhow::anyhow!("lookup unavailable")))
    }
}

fn seeded_store() -> ValuationStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = ValuationStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store.seed_defaults(&AppConfig::default_test()).expect("seed");
    store
}

fn counting(rows: Vec<LocationFactor>) -> CountingSource {
    CountingSource {
        table: LocationTable::from_rows(rows).unwrap(),
        calls: Cell::new(0),
    }
}

#[test]
fn store_latest_inserted_row_wins_for_city() {
    let store = seeded_store();
    // Default seed: Capinzal Centro 0.8 then Capinzal Vila Nova 0.85.
    assert_eq!(store.latest_location_factor("Capinzal", None).unwrap(), Some(0.85));

    store
        .insert_location_factor(&LocationFactor::new("Capinzal", Some("Centro"), None, 0.7))
        .unwrap();
    assert_eq!(store.latest_location_factor("Capinzal", None).unwrap(), Some(0.7));
}

#[test]
fn store_postal_code_narrows_match() {
    let store = seeded_store();
    assert_eq!(
        store.latest_location_factor("Florianópolis", Some("88040-000")).unwrap(),
        Some(1.25)
    );
    assert_eq!(
        store.latest_location_factor("Florianópolis", Some("99999-999")).unwrap(),
        None
    );
}

#[test]
fn unknown_city_resolves_to_neutral_factor() {
    let store = seeded_store();
    let mut calc = ValuationCalculator::new(GlobalParameters::default(), &store);

    assert_eq!(calc.resolve_location_factor("Lages", None), 1.0);
    assert_eq!(calc.resolve_location_factor("Lages", Some("88500-000")), 1.0);
}

#[test]
fn postal_code_miss_does_not_fall_back_to_city_row() {
    let store = seeded_store();
    let mut calc = ValuationCalculator::new(GlobalParameters::default(), &store);
    assert_eq!(calc.resolve_location_factor("Blumenau", Some("00000-000")), 1.0);
    assert_eq!(calc.resolve_location_factor("Blumenau", None), 1.15);
}

#[test]
fn blank_postal_code_means_city_only() {
    let mut calc = ValuationCalculator::new(
        GlobalParameters::default(),
        counting(vec![LocationFactor::new("Joinville", None, Some("89201-000"), 1.1)]),
    );
    assert_eq!(calc.resolve_location_factor("Joinville", Some("   ")), 1.1);
    assert_eq!(calc.resolve_location_factor("Joinville", None), 1.1);
    // Both spellings share one cache entry.
    assert_eq!(calc.locations().calls.get(), 1);
}

#[test]
fn repeated_lookups_hit_the_cache() {
    let mut calc = ValuationCalculator::new(
        GlobalParameters::default(),
        counting(vec![LocationFactor::new("Chapecó", Some("Centro"), Some("89801-000"), 0.95)]),
    );

    for _ in 0..5 {
        assert_eq!(calc.resolve_location_factor("Chapecó", Some("89801-000")), 0.95);
    }
    assert_eq!(calc.locations().calls.get(), 1);

    // A different key is a separate entry.
    calc.resolve_location_factor("Chapecó", None);
    assert_eq!(calc.locations().calls.get(), 2);
    assert_eq!(calc.cache_len(), 2);
}

#[test]
fn misses_are_cached_too() {
    let mut calc = ValuationCalculator::new(GlobalParameters::default(), counting(vec![]));
    calc.resolve_location_factor("Lages", None);
    calc.resolve_location_factor("Lages", None);
    assert_eq!(calc.locations().calls.get(), 1);
}

#[test]
fn cache_survives_table_changes_until_cleared() {
    let store = seeded_store();
    let mut calc = ValuationCalculator::new(GlobalParameters::default(), &store);
    assert_eq!(calc.resolve_location_factor("Chapecó", None), 0.95);

    store
        .insert_location_factor(&LocationFactor::new("Chapecó", Some("Efapi"), None, 1.2))
        .unwrap();
    assert_eq!(calc.resolve_location_factor("Chapecó", None), 0.95);

    calc.clear_cache();
    assert_eq!(calc.cache_len(), 0);
    assert_eq!(calc.resolve_location_factor("Chapecó", None), 1.2);
}

#[test]
fn lookup_errors_fall_back_and_are_not_cached() {
    let mut calc = ValuationCalculator::new(GlobalParameters::default(), BrokenSource);

    assert_eq!(calc.resolve_location_factor("Joinville", None), 1.0);
    assert_eq!(calc.cache_len(), 0);
    assert!(calc.try_resolve_location_factor("Joinville", None).is_err());
}

#[test]
fn lookup_error_zeroes_the_valuation() {
    let mut calc = ValuationCalculator::new(GlobalParameters::default(), BrokenSource);
    let p = Property {
        address: "Rua A, 1".into(),
        city: "Joinville".into(),
        state: "SC".into(),
        area_sqm: 80.0,
        acquisition_cost: Some(200_000.0),
        ..Property::default()
    };

    assert_eq!(calc.compute_financials(&p), ValuationResult::zeroed());
    assert!(calc.try_compute_financials(&p).is_err());
}

#[test]
fn location_factor_bounds_are_enforced() {
    let store = seeded_store();
    for bad in [0.49, 2.01] {
        let err = store
            .insert_location_factor(&LocationFactor::new("Lages", None, None, bad))
            .unwrap_err();
        assert!(matches!(err, ValuationError::InvalidLocationFactor { .. }));
    }
    assert!(LocationFactor::new("", None, None, 1.0).validate().is_err());
    assert!(LocationFactor::new("Lages", None, None, 0.5).validate().is_ok());
    assert!(LocationFactor::new("Lages", None, None, 2.0).validate().is_ok());
}

#[test]
fn in_memory_table_matches_store_semantics() {
    let config = AppConfig::default_test();
    let table = LocationTable::from_rows(config.location_factors.clone()).unwrap();
    let store = seeded_store();

    for (city, cep) in [
        ("Capinzal", None),
        ("Capinzal", Some("89665-000")),
        ("Florianópolis", Some("88037-000")),
        ("Blumenau", None),
        ("Lages", None),
    ] {
        assert_eq!(
            table.latest_factor(city, cep).unwrap(),
            store.latest_factor(city, cep).unwrap(),
            "{city}/{cep:?}"
        );
    }
}

#[test]
fn label_skips_blank_parts() {
    let full = LocationFactor::new("Blumenau", Some("Centro"), Some("89010-000"), 1.2);
    assert_eq!(full.label(), "Blumenau - Centro - 89010-000");
    let bare = LocationFactor::new("Blumenau", None, Some(""), 1.2);
    assert_eq!(bare.label(), "Blumenau");
}
