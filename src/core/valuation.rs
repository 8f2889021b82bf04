use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use super::error::ValuationError;

pub const VALUATION_SCHEMA_VERSION: u32 = 1;

/// Build quality tier of a structure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Mid,
    High,
}

impl Tier {
    pub fn name(self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Mid => "mid",
            Tier::High => "high",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "mid" => Ok(Tier::Mid),
            "high" => Ok(Tier::High),
            _ => Err(ValuationError::InvalidTier {
                given: s.to_string(),
            }),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierParams {
    /// Years for the structure to lose half its value.
    pub half_life_years: f64,
    pub price_per_sqft: f64,
}

/// Per-tier depreciation and construction-cost table.
#[derive(Clone, Debug, PartialEq)]
pub struct TierTable {
    entries: BTreeMap<Tier, TierParams>,
}

impl TierTable {
    pub fn new(entries: BTreeMap<Tier, TierParams>) -> Self {
        Self { entries }
    }

    pub fn get(&self, tier: Tier) -> Result<TierParams, ValuationError> {
        self.entries
            .get(&tier)
            .copied()
            .ok_or(ValuationError::MissingTier(tier))
    }

    pub fn insert(&mut self, tier: Tier, params: TierParams) {
        self.entries.insert(tier, params);
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let entries = [
            (Tier::Basic, 15.0, 175.0),
            (Tier::Mid, 20.0, 225.0),
            (Tier::High, 30.0, 300.0),
        ]
        .into_iter()
        .map(|(tier, half_life_years, price_per_sqft)| {
            (
                tier,
                TierParams {
                    half_life_years,
                    price_per_sqft,
                },
            )
        })
        .collect();
        Self { entries }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyInputs {
    pub sqft: f64,
    pub age_years: f64,
    pub tier: Tier,
    pub land_size_acres: f64,
    pub land_price_per_acre: f64,
    pub land_prep_cost: f64,
    pub opportunity_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValuation {
    pub schema_version: u32,
    pub sqft: f64,
    pub age_years: f64,
    pub tier: Tier,
    pub price_per_sqft: f64,
    pub half_life_years: f64,
    pub structure_initial_value: f64,
    pub depreciation_factor: f64,
    pub structure_current_value: f64,
    pub land_size_acres: f64,
    pub land_price_per_acre: f64,
    pub land_value: f64,
    pub land_prep_cost: f64,
    pub opportunity_cost: f64,
    pub total_market_value: f64,
    pub total_cost_basis: f64,
    pub value_margin: f64,
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValuationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValuationError::InvalidInput {
            field,
            reason: format!("must be finite and >= 0, got {value}"),
        });
    }
    Ok(())
}

/// Market value of a structure depreciating by half-life, plus raw land,
/// compared against what it cost to put together.
pub fn value_property(
    inputs: &PropertyInputs,
    table: &TierTable,
) -> Result<PropertyValuation, ValuationError> {
    for (field, value) in [
        ("sqft", inputs.sqft),
        ("age_years", inputs.age_years),
        ("land_size_acres", inputs.land_size_acres),
        ("land_price_per_acre", inputs.land_price_per_acre),
        ("land_prep_cost", inputs.land_prep_cost),
        ("opportunity_cost", inputs.opportunity_cost),
    ] {
        require_non_negative(field, value)?;
    }

    let params = table.get(inputs.tier)?;
    if !params.half_life_years.is_finite() || params.half_life_years <= 0.0 {
        return Err(ValuationError::InvalidInput {
            field: "half_life_years",
            reason: format!("must be > 0 for tier {}", inputs.tier),
        });
    }
    require_non_negative("price_per_sqft", params.price_per_sqft)?;

    let structure_initial_value = inputs.sqft * params.price_per_sqft;
    let depreciation_factor = 0.5_f64.powf(inputs.age_years / params.half_life_years);
    let structure_current_value = structure_initial_value * depreciation_factor;

    let land_value = inputs.land_size_acres * inputs.land_price_per_acre;

    let total_market_value = structure_current_value + land_value;
    let total_cost_basis =
        structure_initial_value + land_value + inputs.land_prep_cost + inputs.opportunity_cost;

    Ok(PropertyValuation {
        schema_version: VALUATION_SCHEMA_VERSION,
        sqft: inputs.sqft,
        age_years: inputs.age_years,
        tier: inputs.tier,
        price_per_sqft: params.price_per_sqft,
        half_life_years: params.half_life_years,
        structure_initial_value,
        depreciation_factor,
        structure_current_value,
        land_size_acres: inputs.land_size_acres,
        land_price_per_acre: inputs.land_price_per_acre,
        land_value,
        land_prep_cost: inputs.land_prep_cost,
        opportunity_cost: inputs.opportunity_cost,
        total_market_value,
        total_cost_basis,
        value_margin: total_market_value - total_cost_basis,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOpportunityInputs {
    pub rent_per_month: f64,
    pub hourly_wage: f64,
    pub build_duration_years: f64,
    pub daily_management_hours: f64,
}

/// Rent paid while building plus the owner's time spent managing the build.
pub fn build_opportunity_cost(inputs: &BuildOpportunityInputs) -> Result<f64, ValuationError> {
    require_non_negative("rent_per_month", inputs.rent_per_month)?;
    require_non_negative("hourly_wage", inputs.hourly_wage)?;
    require_non_negative("build_duration_years", inputs.build_duration_years)?;
    require_non_negative("daily_management_hours", inputs.daily_management_hours)?;

    let rent_cost = inputs.rent_per_month * 12.0 * inputs.build_duration_years;
    let management_hours = inputs.build_duration_years * 365.0 * inputs.daily_management_hours;
    Ok(rent_cost + management_hours * inputs.hourly_wage)
}
