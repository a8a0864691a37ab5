use valuation_core::{
    config::AppConfig,
    error::ValuationError,
    property::Property,
    region::Region,
    store::{PropertyFilter, ValuationStore},
    types::{FinishTier, PropertyStatus},
};

fn seeded_store() -> ValuationStore {
    let config = AppConfig::default_test();
    let store = ValuationStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store.seed_defaults(&config).expect("seed");
    store.seed_sample_properties(&config).expect("samples");
    store
}

fn listing(city: &str, cep: &str) -> Property {
    Property {
        address: "Rua Nova, 10".into(),
        city: city.into(),
        state: "SC".into(),
        postal_code: Some(cep.into()),
        area_sqm: 72.5,
        bedrooms: 2,
        bathrooms: 1,
        finish_tier: FinishTier::High,
        acquisition_cost: Some(210_000.0),
        renovation_cost: None,
        transaction_cost: Some(6_300.0),
        lender_profit_pct: None,
        ..Property::default()
    }
}

#[test]
fn insert_then_get_preserves_fields() {
    let store = seeded_store();
    let id = store.insert_property(&listing("Blumenau", "89010-000")).unwrap();

    let stored = store.get_property(id).unwrap().expect("property exists");
    assert_eq!(stored.id, Some(id));
    assert_eq!(stored.city, "Blumenau");
    assert_eq!(stored.area_sqm, 72.5);
    assert_eq!(stored.finish_tier, FinishTier::High);
    assert_eq!(stored.renovation_cost, None);
    assert_eq!(stored.lender_profit_pct, None);
    assert_eq!(stored.status, PropertyStatus::UnderAnalysis);
    assert!(stored.created_at.is_some());
}

#[test]
fn missing_property_is_none() {
    let store = seeded_store();
    assert!(store.get_property(9_999).unwrap().is_none());
}

#[test]
fn list_is_in_insertion_order() {
    let store = seeded_store();
    let cities: Vec<String> = store
        .list_properties()
        .unwrap()
        .into_iter()
        .map(|p| p.city)
        .collect();
    assert_eq!(cities, vec!["Florianópolis", "Capinzal", "Joinville"]);
}

#[test]
fn validation_collects_every_failure() {
    let store = seeded_store();
    let bad = Property {
        address: String::new(),
        city: String::new(),
        state: "SC".into(),
        area_sqm: 0.0,
        acquisition_cost: Some(-1.0),
        lender_profit_pct: Some(120.0),
        ..Property::default()
    };

    match store.insert_property(&bad) {
        Err(ValuationError::InvalidProperty { reasons }) => assert_eq!(reasons.len(), 5),
        other => panic!("expected InvalidProperty, got {other:?}"),
    }
    assert_eq!(store.property_count().unwrap(), 3);
}

#[test]
fn update_overwrites_and_bumps_status() {
    let store = seeded_store();
    let mut p = store.get_property(1).unwrap().unwrap();
    p.status = PropertyStatus::Sold;
    p.renovation_cost = Some(60_000.0);
    store.update_property(&p).unwrap();

    let stored = store.get_property(1).unwrap().unwrap();
    assert_eq!(stored.status, PropertyStatus::Sold);
    assert_eq!(stored.renovation_cost, Some(60_000.0));
}

#[test]
fn update_unknown_id_is_not_found() {
    let store = seeded_store();
    let p = Property { id: Some(404), ..listing("Lages", "88500-000") };
    assert!(matches!(
        store.update_property(&p),
        Err(ValuationError::PropertyNotFound { id: 404 })
    ));
}

#[test]
fn update_without_id_is_rejected() {
    let store = seeded_store();
    assert!(matches!(
        store.update_property(&listing("Lages", "88500-000")),
        Err(ValuationError::InvalidProperty { .. })
    ));
}

#[test]
fn delete_removes_row() {
    let store = seeded_store();
    store.delete_property(2).unwrap();
    assert!(store.get_property(2).unwrap().is_none());
    assert!(matches!(
        store.delete_property(2),
        Err(ValuationError::PropertyNotFound { id: 2 })
    ));
}

#[test]
fn postal_code_filter_ignores_punctuation() {
    let store = seeded_store();
    let regions = AppConfig::default_test().region_map();

    for query in ["89665", "89665-000", "896.65"] {
        let filter = PropertyFilter {
            postal_code: Some(query.into()),
            ..PropertyFilter::default()
        };
        let found = store.list_properties_filtered(&filter, &regions).unwrap();
        assert_eq!(found.len(), 1, "query {query}");
        assert_eq!(found[0].city, "Capinzal");
    }
}

#[test]
fn city_and_state_filters_are_exact() {
    let store = seeded_store();
    let regions = AppConfig::default_test().region_map();

    let by_city = PropertyFilter {
        city: Some("Joinville".into()),
        ..PropertyFilter::default()
    };
    assert_eq!(store.list_properties_filtered(&by_city, &regions).unwrap().len(), 1);

    let wrong_state = PropertyFilter {
        state: Some("PR".into()),
        ..PropertyFilter::default()
    };
    assert!(store.list_properties_filtered(&wrong_state, &regions).unwrap().is_empty());
}

#[test]
fn region_filter_uses_city_table() {
    let store = seeded_store();
    let regions = AppConfig::default_test().region_map();
    store.insert_property(&listing("Lages", "88500-000")).unwrap();

    let region = |r: Region| PropertyFilter {
        region: Some(r),
        ..PropertyFilter::default()
    };
    let west = store.list_properties_filtered(&region(Region::West), &regions).unwrap();
    assert_eq!(west.len(), 1);
    assert_eq!(west[0].city, "Capinzal");

    let central = store.list_properties_filtered(&region(Region::Central), &regions).unwrap();
    assert_eq!(central.len(), 1);
    assert_eq!(central[0].city, "Lages");
}

#[test]
fn empty_filter_returns_everything() {
    let store = seeded_store();
    let regions = AppConfig::default_test().region_map();
    let all = store
        .list_properties_filtered(&PropertyFilter::default(), &regions)
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn full_address_skips_missing_postal_code() {
    let p = Property {
        postal_code: None,
        ..listing("Blumenau", "")
    };
    assert_eq!(p.full_address(), "Rua Nova, 10, Blumenau, SC");
    assert_eq!(
        listing("Blumenau", "89010-000").full_address(),
        "Rua Nova, 10, Blumenau, SC, 89010-000"
    );
}

#[test]
fn region_filter_places_unlisted_city_by_coordinates() {
    let store = seeded_store();
    let regions = AppConfig::default_test().region_map();
    store
        .insert_property(&Property {
            latitude: Some(-26.03),
            longitude: Some(-48.85),
            ..listing("Garuva", "89248-000")
        })
        .unwrap();

    let north = PropertyFilter {
        region: Some(Region::North),
        ..PropertyFilter::default()
    };
    let cities: Vec<String> = store
        .list_properties_filtered(&north, &regions)
        .unwrap()
        .into_iter()
        .map(|p| p.city)
        .collect();
    assert_eq!(cities, vec!["Joinville", "Garuva"]);
}
