use valuation_core::{
    calculator::ValuationCalculator,
    location::LocationTable,
    parameters::GlobalParameters,
    property::Property,
    scenario::scenario_key,
};

fn deal() -> Property {
    Property {
        address: "Rua Teste, 123".into(),
        city: "Capinzal".into(),
        state: "SC".into(),
        area_sqm: 100.0,
        acquisition_cost: Some(300_000.0),
        renovation_cost: Some(50_000.0),
        transaction_cost: Some(15_000.0),
        lender_profit_pct: Some(10.0),
        ..Property::default()
    }
}

fn calculator() -> ValuationCalculator<LocationTable> {
    ValuationCalculator::new(GlobalParameters::default(), LocationTable::new())
}

#[test]
fn keys_keep_decimal_point() {
    assert_eq!(scenario_key(10.0, 15.0), "credor_10.0_investidor_15.0");
    assert_eq!(scenario_key(12.5, 20.0), "credor_12.5_investidor_20.0");
}

#[test]
fn grid_covers_every_combination() {
    let mut calc = calculator();
    let scenarios = calc.simulate_scenarios(&deal(), &[5.0, 10.0, 15.0], &[10.0, 20.0]);

    assert_eq!(scenarios.len(), 6);
    for lender in [5.0, 10.0, 15.0] {
        for investor in [10.0, 20.0] {
            let s = &scenarios[&scenario_key(lender, investor)];
            assert_eq!(s.lender_pct, lender);
            assert_eq!(s.investor_pct, investor);
        }
    }
}

#[test]
fn lender_pct_drives_minimum_price() {
    let mut calc = calculator();
    let scenarios = calc.simulate_scenarios(&deal(), &[5.0, 20.0], &[15.0]);

    assert_eq!(scenarios["credor_5.0_investidor_15.0"].minimum_price, 383_250.0);
    assert_eq!(scenarios["credor_20.0_investidor_15.0"].minimum_price, 438_000.0);
}

#[test]
fn investor_pct_is_echoed_but_does_not_change_figures() {
    let mut calc = calculator();
    let scenarios = calc.simulate_scenarios(&deal(), &[10.0], &[5.0, 50.0]);

    let low = &scenarios["credor_10.0_investidor_5.0"];
    let high = &scenarios["credor_10.0_investidor_50.0"];
    assert_eq!(low.margin, high.margin);
    assert_eq!(low.roi_pct, high.roi_pct);
    assert_eq!(low.minimum_price, high.minimum_price);
}

#[test]
fn original_property_is_untouched() {
    let mut calc = calculator();
    let p = deal();
    calc.simulate_scenarios(&p, &[30.0], &[15.0]);
    assert_eq!(p.lender_profit_pct, Some(10.0));
    assert_eq!(calc.compute_financials(&p).minimum_price, 401_500.0);
}

#[test]
fn empty_candidates_yield_empty_grid() {
    let mut calc = calculator();
    assert!(calc.simulate_scenarios(&deal(), &[], &[15.0]).is_empty());
    assert!(calc.simulate_scenarios(&deal(), &[10.0], &[]).is_empty());
}
