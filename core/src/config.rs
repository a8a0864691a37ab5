use crate::{
    location::LocationFactor,
    parameters::GlobalParameters,
    property::Property,
    region::{Region, RegionEntry, RegionMap},
    types::{FinishTier, PropertyStatus},
};
use serde::{de::DeserializeOwned, Deserialize};

#[derive(Debug, Clone, Deserialize)]
struct ParametersFile {
    parameters: GlobalParameters,
}

#[derive(Debug, Clone, Deserialize)]
struct LocationFactorsFile {
    location_factors: Vec<LocationFactor>,
}

#[derive(Debug, Clone, Deserialize)]
struct RegionsFile {
    regions: Vec<RegionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct SamplePropertiesFile {
    properties: Vec<Property>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Written to the store on first run; stored values win afterwards.
    pub default_parameters: GlobalParameters,
    /// Seeded only into an empty location table.
    pub location_factors:   Vec<LocationFactor>,
    pub regions:            Vec<RegionEntry>,
    pub sample_properties:  Vec<Property>,
}

impl AppConfig {
    /// Load from the data/ directory.
    /// In tests, use AppConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let params_file: ParametersFile =
            read_json(&format!("{data_dir}/parameters/global_parameters.json"))?;
        let locations_file: LocationFactorsFile =
            read_json(&format!("{data_dir}/locations/location_factors.json"))?;
        let regions_file: RegionsFile =
            read_json(&format!("{data_dir}/regions/regions.json"))?;
        let samples_file: SamplePropertiesFile =
            read_json(&format!("{data_dir}/samples/properties.json"))?;

        for factor in &locations_file.location_factors {
            factor
                .validate()
                .map_err(|e| anyhow::anyhow!("Bad location factor '{}': {e}", factor.label()))?;
        }
        params_file
            .parameters
            .validate()
            .map_err(|e| anyhow::anyhow!("Bad default parameters: {e}"))?;

        log::info!(
            "config: loaded {} location factors, {} regions, {} sample properties from {data_dir}",
            locations_file.location_factors.len(),
            regions_file.regions.len(),
            samples_file.properties.len()
        );

        Ok(Self {
            default_parameters: params_file.parameters,
            location_factors:   locations_file.location_factors,
            regions:            regions_file.regions,
            sample_properties:  samples_file.properties,
        })
    }

    pub fn region_map(&self) -> RegionMap {
        RegionMap::from_entries(&self.regions)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let location_factors = [
            ("Florianópolis", "Centro",         "88010-000", 1.3),
            ("Florianópolis", "Trindade",       "88040-000", 1.25),
            ("Florianópolis", "Córrego Grande", "88037-000", 1.4),
            ("Criciúma",      "Centro",         "88801-000", 0.9),
            ("Criciúma",      "São Luiz",       "88802-000", 1.0),
            ("Capinzal",      "Centro",         "89665-000", 0.8),
            ("Capinzal",      "Vila Nova",      "89665-001", 0.85),
            ("Blumenau",      "Centro",         "89010-000", 1.2),
            ("Blumenau",      "Vila Nova",      "89036-000", 1.15),
            ("Joinville",     "Centro",         "89201-000", 1.1),
            ("Joinville",     "Boa Vista",      "89205-000", 1.05),
            ("Chapecó",       "Centro",         "89801-000", 0.95),
        ]
        .into_iter()
        .map(|(city, hood, cep, factor)| LocationFactor::new(city, Some(hood), Some(cep), factor))
        .collect();

        let regions = vec![
            RegionEntry {
                region: Region::North,
                cities: vec!["Joinville".into(), "Blumenau".into(), "Jaraguá do Sul".into()],
            },
            RegionEntry {
                region: Region::South,
                cities: vec!["Criciúma".into(), "Tubarão".into(), "Laguna".into()],
            },
            RegionEntry {
                region: Region::West,
                cities: vec!["Chapecó".into(), "Capinzal".into(), "Concórdia".into()],
            },
            RegionEntry {
                region: Region::East,
                cities: vec!["Florianópolis".into(), "São José".into(), "Itajaí".into()],
            },
        ];

        let sample_properties = vec![
            Property {
                address: "Rua das Palmeiras, 123".into(),
                city: "Florianópolis".into(),
                state: "SC".into(),
                postal_code: Some("88010-000".into()),
                latitude: Some(-27.5969),
                longitude: Some(-48.5495),
                area_sqm: 85.0,
                bedrooms: 2,
                bathrooms: 1,
                year_built: Some(2015),
                finish_tier: FinishTier::Medium,
                acquisition_cost: Some(280_000.0),
                renovation_cost: Some(45_000.0),
                transaction_cost: Some(12_000.0),
                lender_profit_pct: Some(12.0),
                status: PropertyStatus::UnderAnalysis,
                ..Property::default()
            },
            Property {
                address: "Rua XV de Novembro, 456".into(),
                city: "Capinzal".into(),
                state: "SC".into(),
                postal_code: Some("89665-000".into()),
                area_sqm: 110.0,
                bedrooms: 3,
                bathrooms: 2,
                year_built: Some(2010),
                finish_tier: FinishTier::Low,
                acquisition_cost: Some(250_000.0),
                renovation_cost: Some(30_000.0),
                transaction_cost: Some(10_000.0),
                lender_profit_pct: Some(10.0),
                status: PropertyStatus::Purchased,
                ..Property::default()
            },
            Property {
                address: "Rua das Flores, 789".into(),
                city: "Joinville".into(),
                state: "SC".into(),
                postal_code: Some("89201-000".into()),
                area_sqm: 140.0,
                bedrooms: 3,
                bathrooms: 2,
                year_built: Some(2020),
                finish_tier: FinishTier::High,
                acquisition_cost: Some(520_000.0),
                renovation_cost: Some(20_000.0),
                transaction_cost: Some(21_000.0),
                lender_profit_pct: None,
                status: PropertyStatus::UnderAnalysis,
                ..Property::default()
            },
        ];

        Self {
            default_parameters: GlobalParameters::default(),
            location_factors,
            regions,
            sample_properties,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let parsed = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
    Ok(parsed)
}
