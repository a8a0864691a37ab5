//! valuation-runner: headless front-end for the property valuation desk.
//!
//! Usage:
//!   valuation-runner --db desk.db --seed-samples
//!   valuation-runner --db desk.db --region Oeste
//!   valuation-runner --db desk.db --property 3 --lender 8,10,12 --investor 15,20
//!   valuation-runner --db desk.db --backup desk.bak
//!   valuation-runner --db desk.db --restore desk.bak
//!   valuation-runner --db desk.db --ipc-mode

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, Write};
use valuation_core::{
    calculator::{ValuationCalculator, ValuationResult},
    config::AppConfig,
    format::{format_area, format_currency, format_payback, format_percent},
    location::LocationFactor,
    parameters::GlobalParameters,
    property::Property,
    region::{Region, RegionMap},
    scenario::ScenarioSummary,
    store::{PropertyFilter, ValuationStore},
    types::PropertyId,
    viability::{evaluate_viability, ViabilityReport},
};

type StoreCalculator<'a> = ValuationCalculator<&'a ValuationStore>;

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    List {
        #[serde(default)]
        filter: IpcFilter,
    },
    Evaluate {
        property_id: PropertyId,
    },
    Simulate {
        property_id: PropertyId,
        lender:      Vec<f64>,
        investor:    Vec<f64>,
    },
    GetParameters,
    SetParameters {
        parameters: GlobalParameters,
    },
    ResetParameters,
    AddLocationFactor {
        factor: LocationFactor,
    },
    ClearCache,
    Quit,
}

#[derive(Deserialize, Default)]
struct IpcFilter {
    #[serde(default)]
    cep:    Option<String>,
    #[serde(default)]
    city:   Option<String>,
    #[serde(default)]
    state:  Option<String>,
    #[serde(default)]
    region: Option<Region>,
}

#[derive(Serialize)]
struct TableRow {
    id:              PropertyId,
    address:         String,
    city:            String,
    state:           String,
    postal_code:     Option<String>,
    total_cost:      f64,
    estimated_price: f64,
    margin:          f64,
    roi_pct:         f64,
}

#[derive(Serialize)]
struct Evaluation {
    property:  Property,
    result:    ValuationResult,
    viability: ViabilityReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let seed_samples = args.iter().any(|a| a == "--seed-samples");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    let config = AppConfig::load(data_dir)?;
    let regions = config.region_map();

    let store = ValuationStore::open(db)?;
    store.migrate()?;
    if let Some(src) = string_arg(&args, "--restore") {
        store.restore_from(src)?;
        println!("Restored from {src}");
    }
    store.seed_defaults(&config)?;
    if seed_samples {
        store.seed_sample_properties(&config)?;
    }

    let params = store.load_parameters()?;
    let mut calculator = ValuationCalculator::new(params, &store);

    if ipc_mode {
        return run_ipc_loop(&mut calculator, &regions);
    }

    if let Some(dest) = string_arg(&args, "--backup") {
        store.backup_to(dest)?;
        println!("Backup written to {dest}");
    }

    match parse_arg::<PropertyId>(&args, "--property") {
        Some(id) => {
            let property = store
                .get_property(id)?
                .ok_or_else(|| anyhow::anyhow!("Property {id} not found"))?;
            print_detail(&mut calculator, &property);

            let lender = parse_list(&args, "--lender");
            let investor = parse_list(&args, "--investor");
            if !lender.is_empty() && !investor.is_empty() {
                let scenarios = calculator.simulate_scenarios(&property, &lender, &investor);
                print_scenarios(&scenarios);
            }
        }
        None => {
            let filter = PropertyFilter {
                postal_code: string_arg(&args, "--cep").map(str::to_string),
                city:        string_arg(&args, "--city").map(str::to_string),
                state:       string_arg(&args, "--state").map(str::to_string),
                region:      string_arg(&args, "--region").and_then(Region::parse),
            };
            let rows = build_table(&mut calculator, &filter, &regions)?;
            print_table(&rows);
        }
    }

    Ok(())
}

fn run_ipc_loop(calculator: &mut StoreCalculator<'_>, regions: &RegionMap) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let response = match handle_command(calculator, regions, cmd) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("ipc: command failed: {e}");
                serde_json::json!({ "error": e.to_string() })
            }
        };
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    calculator: &mut StoreCalculator<'_>,
    regions: &RegionMap,
    cmd: IpcCommand,
) -> Result<serde_json::Value> {
    let value = match cmd {
        IpcCommand::List { filter } => {
            let filter = PropertyFilter {
                postal_code: filter.cep,
                city:        filter.city,
                state:       filter.state,
                region:      filter.region,
            };
            serde_json::to_value(build_table(calculator, &filter, regions)?)?
        }
        IpcCommand::Evaluate { property_id } => {
            let property = find_property(calculator, property_id)?;
            let result = calculator.compute_financials(&property);
            let viability = evaluate_viability(&result);
            serde_json::to_value(Evaluation { property, result, viability })?
        }
        IpcCommand::Simulate { property_id, lender, investor } => {
            let property = find_property(calculator, property_id)?;
            serde_json::to_value(calculator.simulate_scenarios(&property, &lender, &investor))?
        }
        IpcCommand::GetParameters => serde_json::to_value(calculator.parameters())?,
        IpcCommand::SetParameters { parameters } => {
            calculator.locations().save_parameters(&parameters)?;
            calculator.set_parameters(parameters);
            serde_json::to_value(calculator.parameters())?
        }
        IpcCommand::ResetParameters => {
            let defaults = calculator.locations().reset_parameters()?;
            calculator.set_parameters(defaults);
            serde_json::to_value(calculator.parameters())?
        }
        IpcCommand::AddLocationFactor { factor } => {
            let id = calculator.locations().insert_location_factor(&factor)?;
            calculator.clear_cache();
            serde_json::json!({ "id": id })
        }
        IpcCommand::ClearCache => {
            calculator.clear_cache();
            serde_json::json!({ "cleared": true })
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn find_property(calculator: &StoreCalculator<'_>, id: PropertyId) -> Result<Property> {
    calculator
        .locations()
        .get_property(id)?
        .ok_or_else(|| anyhow::anyhow!("Property {id} not found"))
}

fn build_table(
    calculator: &mut StoreCalculator<'_>,
    filter: &PropertyFilter,
    regions: &RegionMap,
) -> Result<Vec<TableRow>> {
    let properties = calculator.locations().list_properties_filtered(filter, regions)?;
    let rows = properties
        .into_iter()
        .map(|p| {
            let result = calculator.compute_financials(&p);
            TableRow {
                id:              p.id.unwrap_or_default(),
                address:         p.address,
                city:            p.city,
                state:           p.state,
                postal_code:     p.postal_code,
                total_cost:      result.total_cost,
                estimated_price: result.estimated_price,
                margin:          result.margin,
                roi_pct:         result.roi_pct,
            }
        })
        .collect();
    Ok(rows)
}

fn print_table(rows: &[TableRow]) {
    println!(
        "{:>4}  {:<32} {:<18} {:>14} {:>14} {:>14} {:>8}",
        "id", "address", "city", "total cost", "est. price", "margin", "ROI"
    );
    for row in rows {
        println!(
            "{:>4}  {:<32} {:<18} {:>14} {:>14} {:>14} {:>8}",
            row.id,
            row.address,
            row.city,
            format_currency(row.total_cost),
            format_currency(row.estimated_price),
            format_currency(row.margin),
            format_percent(row.roi_pct, 1),
        );
    }
    println!();
    println!("{} properties found", rows.len());
}

fn print_detail(calculator: &mut StoreCalculator<'_>, property: &Property) {
    let (result, viability) = calculator.assess(property);

    println!("=== {} ===", property.full_address());
    println!("  area:             {}", format_area(property.area_sqm));
    println!("  finish tier:      {}", property.finish_tier.as_str());
    println!("  location factor:  {:.2}", result.location_factor);
    println!("  finish factor:    {:.2}", result.finish_factor);
    println!();
    println!("  estimated price:  {}", format_currency(result.estimated_price));
    println!("  total cost:       {}", format_currency(result.total_cost));
    println!(
        "  lender profit:    {} ({})",
        format_currency(result.lender_profit),
        format_percent(result.lender_pct, 1)
    );
    println!(
        "  investor profit:  {} ({})",
        format_currency(result.investor_profit),
        format_percent(result.investor_pct, 1)
    );
    println!("  minimum price:    {}", format_currency(result.minimum_price));
    println!("  margin:           {}", format_currency(result.margin));
    println!("  ROI:              {}", format_percent(result.roi_pct, 1));
    println!("  payback:          {}", format_payback(result.payback_months));
    println!();
    println!(
        "  viable:           {}",
        if viability.viable { "yes" } else { "no" }
    );
    for rec in &viability.recommendations {
        println!("    - {rec}");
    }
}

fn print_scenarios(scenarios: &BTreeMap<String, ScenarioSummary>) {
    println!();
    println!("=== SCENARIOS ===");
    for (key, s) in scenarios {
        println!(
            "  {:<32} margin {:>14}  ROI {:>8}  min. price {:>14}",
            key,
            format_currency(s.margin),
            format_percent(s.roi_pct, 1),
            format_currency(s.minimum_price),
        );
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    string_arg(args, flag).and_then(|v| v.parse().ok())
}

/// `--lender 8,10,12` -> [8.0, 10.0, 12.0]; bad entries are skipped.
fn parse_list(args: &[String], flag: &str) -> Vec<f64> {
    string_arg(args, flag)
        .map(|v| {
            v.split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}
