use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    BreakEvenRule, BuildOpportunityInputs, ParamRange, ParamUnit, PropertyInputs, Scenario,
    ScenarioError, SweepError, SweepOptions, SweepParam, Tier, TierTable, ValuationError,
    build_opportunity_cost, simulate, sweep_1d, sweep_2d, value_property,
};
use crate::report;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliSweepParam {
    HomePrice,
    #[value(name = "down-payment")]
    DownPayment,
    MortgageRate,
    LoanTermYears,
    PropertyTaxRate,
    MaintenanceRate,
    HomeAppreciationRate,
    MonthlyRent,
    RentIncreaseRate,
    MarginalTaxRate,
    StandardDeduction,
    HorizonYears,
    #[value(name = "closing-cost")]
    ClosingCost,
    #[value(name = "selling-cost")]
    SellingCost,
    InvestmentReturnRate,
}

impl From<CliSweepParam> for SweepParam {
    fn from(value: CliSweepParam) -> Self {
        match value {
            CliSweepParam::HomePrice => SweepParam::HomePrice,
            CliSweepParam::DownPayment => SweepParam::DownPaymentFraction,
            CliSweepParam::MortgageRate => SweepParam::MortgageRate,
            CliSweepParam::LoanTermYears => SweepParam::LoanTermYears,
            CliSweepParam::PropertyTaxRate => SweepParam::PropertyTaxRate,
            CliSweepParam::MaintenanceRate => SweepParam::MaintenanceRate,
            CliSweepParam::HomeAppreciationRate => SweepParam::HomeAppreciationRate,
            CliSweepParam::MonthlyRent => SweepParam::MonthlyRent,
            CliSweepParam::RentIncreaseRate => SweepParam::RentIncreaseRate,
            CliSweepParam::MarginalTaxRate => SweepParam::MarginalTaxRate,
            CliSweepParam::StandardDeduction => SweepParam::StandardDeduction,
            CliSweepParam::HorizonYears => SweepParam::HorizonYears,
            CliSweepParam::ClosingCost => SweepParam::ClosingCostFraction,
            CliSweepParam::SellingCost => SweepParam::SellingCostFraction,
            CliSweepParam::InvestmentReturnRate => SweepParam::InvestmentReturnRate,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliBreakEvenRule {
    FirstCrossing,
    Sustained,
}

impl From<CliBreakEvenRule> for BreakEvenRule {
    fn from(value: CliBreakEvenRule) -> Self {
        match value {
            CliBreakEvenRule::FirstCrossing => BreakEvenRule::FirstCrossing,
            CliBreakEvenRule::Sustained => BreakEvenRule::Sustained,
        }
    }
}

/// Scenario values from a JSON file or from flags. Rates are in percent.
#[derive(Args, Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ScenarioOverrides {
    #[arg(long, global = true, help = "Purchase price in dollars")]
    pub home_price: Option<f64>,
    #[arg(long, global = true, help = "Down payment in percent of price, e.g. 5")]
    pub down_payment: Option<f64>,
    #[arg(long, global = true, help = "Mortgage annual rate in percent")]
    pub mortgage_rate: Option<f64>,
    #[arg(long, global = true)]
    pub loan_term_years: Option<u32>,
    #[arg(long, global = true, help = "Property tax in percent of price per year")]
    pub property_tax_rate: Option<f64>,
    #[arg(long, global = true, help = "Maintenance in percent of price per year")]
    pub maintenance_rate: Option<f64>,
    #[arg(long, global = true, help = "Annual home appreciation in percent")]
    pub home_appreciation_rate: Option<f64>,
    #[arg(long, global = true, help = "Starting monthly rent in dollars")]
    pub monthly_rent: Option<f64>,
    #[arg(long, global = true, help = "Annual rent increase in percent")]
    pub rent_increase_rate: Option<f64>,
    #[arg(long, global = true, help = "Marginal income tax rate in percent")]
    pub marginal_tax_rate: Option<f64>,
    #[arg(long, global = true, help = "Standard deduction in dollars")]
    pub standard_deduction: Option<f64>,
    #[arg(long, global = true)]
    pub horizon_years: Option<u32>,
    #[arg(long, global = true, help = "Closing cost in percent of price")]
    pub closing_cost: Option<f64>,
    #[arg(long, global = true, help = "Selling cost in percent of sale value")]
    pub selling_cost: Option<f64>,
    #[arg(long, global = true, help = "Annual return on invested savings in percent")]
    pub investment_return_rate: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "rentbuy",
    about = "Buy-vs-rent break-even calculator with the opportunity cost of invested savings"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "JSON scenario file (camelCase keys, rates in percent); flags override it"
    )]
    pub scenario: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ScenarioOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate one scenario year by year
    Simulate {
        #[arg(long, help = "Write the yearly records to this CSV file")]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Break-even year across a range of one parameter
    #[command(name = "sweep-1d")]
    Sweep1d {
        #[arg(long, value_enum)]
        param: CliSweepParam,
        #[arg(long, help = "start:stop:step in the parameter's units, stop excluded")]
        range: String,
        #[arg(
            long,
            default_value_t = true,
            action = ArgAction::Set,
            help = "Also apply rent-increase values as home appreciation"
        )]
        couple_appreciation: bool,
        #[arg(long, value_enum, default_value_t = CliBreakEvenRule::FirstCrossing)]
        rule: CliBreakEvenRule,
        #[arg(long)]
        json: bool,
    },
    /// Break-even grid across two parameters
    #[command(name = "sweep-2d")]
    Sweep2d {
        #[arg(long, value_enum)]
        rows: CliSweepParam,
        #[arg(long, help = "start:stop:step for the row parameter")]
        row_range: String,
        #[arg(long, value_enum)]
        cols: CliSweepParam,
        #[arg(long, help = "start:stop:step for the column parameter")]
        col_range: String,
        #[arg(long, default_value_t = false, action = ArgAction::Set)]
        couple_appreciation: bool,
        #[arg(long, value_enum, default_value_t = CliBreakEvenRule::FirstCrossing)]
        rule: CliBreakEvenRule,
        #[arg(long)]
        json: bool,
    },
    /// Land and structure valuation with tier-based depreciation
    Valuation(ValuationArgs),
}

#[derive(Args, Debug)]
pub struct ValuationArgs {
    #[arg(long)]
    pub sqft: f64,
    #[arg(long, help = "Structure age in years")]
    pub age: f64,
    #[arg(long, default_value = "mid", help = "Build quality: basic, mid or high")]
    pub tier: String,
    #[arg(long)]
    pub land_acres: f64,
    #[arg(long)]
    pub land_price_per_acre: f64,
    #[arg(long, default_value_t = 0.0)]
    pub land_prep_cost: f64,
    #[arg(
        long,
        help = "Opportunity cost in dollars; computed from the build flags when omitted"
    )]
    pub opportunity_cost: Option<f64>,
    #[arg(long, default_value_t = 0.0, help = "Rent paid per month while building")]
    pub build_rent_per_month: f64,
    #[arg(long, default_value_t = 0.0)]
    pub hourly_wage: f64,
    #[arg(long, default_value_t = 0.0)]
    pub build_years: f64,
    #[arg(long, default_value_t = 0.0)]
    pub daily_management_hours: f64,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("failed to read scenario file {}: {source}", .path.display())]
    ReadScenario {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid scenario file {}: {source}", .path.display())]
    ParseScenario {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Scenario in CLI units (rates in percent), before conversion to fractions.
#[derive(Debug, Clone, PartialEq)]
struct ScenarioSettings {
    home_price: f64,
    down_payment: f64,
    mortgage_rate: f64,
    loan_term_years: u32,
    property_tax_rate: f64,
    maintenance_rate: f64,
    home_appreciation_rate: f64,
    monthly_rent: f64,
    rent_increase_rate: f64,
    marginal_tax_rate: f64,
    standard_deduction: f64,
    horizon_years: u32,
    closing_cost: f64,
    selling_cost: f64,
    investment_return_rate: f64,
}

fn default_settings() -> ScenarioSettings {
    let base = Scenario::default();
    ScenarioSettings {
        home_price: base.home_price,
        down_payment: base.down_payment_fraction * 100.0,
        mortgage_rate: base.mortgage_rate * 100.0,
        loan_term_years: base.loan_term_years,
        property_tax_rate: base.property_tax_rate * 100.0,
        maintenance_rate: base.maintenance_rate * 100.0,
        home_appreciation_rate: base.home_appreciation_rate * 100.0,
        monthly_rent: base.monthly_rent,
        rent_increase_rate: base.rent_increase_rate * 100.0,
        marginal_tax_rate: base.marginal_tax_rate * 100.0,
        standard_deduction: base.standard_deduction,
        horizon_years: base.horizon_years,
        closing_cost: base.closing_cost_fraction * 100.0,
        selling_cost: base.selling_cost_fraction * 100.0,
        investment_return_rate: base.investment_return_rate * 100.0,
    }
}

fn apply_overrides(settings: &mut ScenarioSettings, overrides: &ScenarioOverrides) {
    if let Some(v) = overrides.home_price {
        settings.home_price = v;
    }
    if let Some(v) = overrides.down_payment {
        settings.down_payment = v;
    }
    if let Some(v) = overrides.mortgage_rate {
        settings.mortgage_rate = v;
    }
    if let Some(v) = overrides.loan_term_years {
        settings.loan_term_years = v;
    }
    if let Some(v) = overrides.property_tax_rate {
        settings.property_tax_rate = v;
    }
    if let Some(v) = overrides.maintenance_rate {
        settings.maintenance_rate = v;
    }
    if let Some(v) = overrides.home_appreciation_rate {
        settings.home_appreciation_rate = v;
    }
    if let Some(v) = overrides.monthly_rent {
        settings.monthly_rent = v;
    }
    if let Some(v) = overrides.rent_increase_rate {
        settings.rent_increase_rate = v;
    }
    if let Some(v) = overrides.marginal_tax_rate {
        settings.marginal_tax_rate = v;
    }
    if let Some(v) = overrides.standard_deduction {
        settings.standard_deduction = v;
    }
    if let Some(v) = overrides.horizon_years {
        settings.horizon_years = v;
    }
    if let Some(v) = overrides.closing_cost {
        settings.closing_cost = v;
    }
    if let Some(v) = overrides.selling_cost {
        settings.selling_cost = v;
    }
    if let Some(v) = overrides.investment_return_rate {
        settings.investment_return_rate = v;
    }
}

fn build_scenario(settings: &ScenarioSettings) -> Result<Scenario, String> {
    if settings.horizon_years == 0 {
        return Err("--horizon-years must be > 0".to_string());
    }

    if settings.loan_term_years == 0 {
        return Err("--loan-term-years must be > 0".to_string());
    }

    if !(0.0..=100.0).contains(&settings.down_payment) {
        return Err("--down-payment must be between 0 and 100".to_string());
    }

    for (name, value) in [
        ("--home-price", settings.home_price),
        ("--mortgage-rate", settings.mortgage_rate),
        ("--property-tax-rate", settings.property_tax_rate),
        ("--maintenance-rate", settings.maintenance_rate),
        ("--home-appreciation-rate", settings.home_appreciation_rate),
        ("--monthly-rent", settings.monthly_rent),
        ("--rent-increase-rate", settings.rent_increase_rate),
        ("--marginal-tax-rate", settings.marginal_tax_rate),
        ("--standard-deduction", settings.standard_deduction),
        ("--closing-cost", settings.closing_cost),
        ("--selling-cost", settings.selling_cost),
        ("--investment-return-rate", settings.investment_return_rate),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    Ok(Scenario {
        home_price: settings.home_price,
        down_payment_fraction: settings.down_payment / 100.0,
        mortgage_rate: settings.mortgage_rate / 100.0,
        loan_term_years: settings.loan_term_years,
        property_tax_rate: settings.property_tax_rate / 100.0,
        maintenance_rate: settings.maintenance_rate / 100.0,
        home_appreciation_rate: settings.home_appreciation_rate / 100.0,
        monthly_rent: settings.monthly_rent,
        rent_increase_rate: settings.rent_increase_rate / 100.0,
        marginal_tax_rate: settings.marginal_tax_rate / 100.0,
        standard_deduction: settings.standard_deduction,
        horizon_years: settings.horizon_years,
        closing_cost_fraction: settings.closing_cost / 100.0,
        selling_cost_fraction: settings.selling_cost / 100.0,
        investment_return_rate: settings.investment_return_rate / 100.0,
    })
}

fn read_scenario_file(path: &Path) -> Result<ScenarioOverrides, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadScenario {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseScenario {
        path: path.to_path_buf(),
        source,
    })
}

/// Defaults, then the scenario file, then flags.
pub fn resolve_scenario(cli: &Cli) -> Result<Scenario, CliError> {
    let mut settings = default_settings();
    if let Some(path) = &cli.scenario {
        let from_file = read_scenario_file(path)?;
        tracing::debug!(path = %path.display(), "applying scenario file");
        apply_overrides(&mut settings, &from_file);
    }
    apply_overrides(&mut settings, &cli.overrides);
    let scenario = build_scenario(&settings).map_err(CliError::Usage)?;
    Ok(scenario.validated()?)
}

fn parse_range(spec: &str, flag: &str) -> Result<ParamRange, CliError> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        return Err(CliError::Usage(format!(
            "{flag} must be start:stop:step, got '{spec}'"
        )));
    }
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| CliError::Usage(format!("{flag}: cannot parse '{s}': {e}")))
    };
    Ok(ParamRange {
        start: parse(parts[0])?,
        stop: parse(parts[1])?,
        step: parse(parts[2])?,
    })
}

/// Sweep values in model units; rate ranges are given in percent.
fn sweep_values(param: SweepParam, spec: &str, flag: &str) -> Result<Vec<f64>, CliError> {
    let values = parse_range(spec, flag)?.values(param)?;
    Ok(match param.unit() {
        ParamUnit::Rate => values.into_iter().map(|v| v / 100.0).collect(),
        ParamUnit::Dollars | ParamUnit::Years => values,
    })
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    match &cli.command {
        Command::Simulate { csv, json } => {
            let scenario = resolve_scenario(&cli)?;
            let trajectory = simulate(&scenario)?;
            if let Some(path) = csv {
                let file = fs::File::create(path)?;
                report::write_trajectory_csv(file, &trajectory)?;
                tracing::info!(path = %path.display(), rows = trajectory.years.len(), "wrote csv");
            }
            if *json {
                write_json(out, &trajectory)?;
            } else {
                write!(out, "{}", report::render_trajectory(&trajectory))?;
            }
        }
        Command::Sweep1d {
            param,
            range,
            couple_appreciation,
            rule,
            json,
        } => {
            let scenario = resolve_scenario(&cli)?;
            let param = SweepParam::from(*param);
            let values = sweep_values(param, range, "--range")?;
            let options = SweepOptions {
                couple_appreciation_to_rent_growth: Some(*couple_appreciation),
                rule: (*rule).into(),
            };
            let series = sweep_1d(&scenario, param, &values, options)?;
            if *json {
                write_json(out, &series)?;
            } else {
                write!(out, "{}", report::render_series(&series))?;
            }
        }
        Command::Sweep2d {
            rows,
            row_range,
            cols,
            col_range,
            couple_appreciation,
            rule,
            json,
        } => {
            let scenario = resolve_scenario(&cli)?;
            let row_param = SweepParam::from(*rows);
            let col_param = SweepParam::from(*cols);
            if row_param == col_param {
                return Err(CliError::Usage(
                    "--rows and --cols must name different parameters".to_string(),
                ));
            }
            let row_values = sweep_values(row_param, row_range, "--row-range")?;
            let col_values = sweep_values(col_param, col_range, "--col-range")?;
            let options = SweepOptions {
                couple_appreciation_to_rent_growth: Some(*couple_appreciation),
                rule: (*rule).into(),
            };
            let grid = sweep_2d(
                &scenario,
                row_param,
                &row_values,
                col_param,
                &col_values,
                options,
            )?;
            if *json {
                write_json(out, &grid)?;
            } else {
                write!(out, "{}", report::render_grid(&grid))?;
            }
        }
        Command::Valuation(args) => {
            let tier: Tier = args.tier.parse()?;
            let opportunity_cost = match args.opportunity_cost {
                Some(v) => v,
                None => build_opportunity_cost(&BuildOpportunityInputs {
                    rent_per_month: args.build_rent_per_month,
                    hourly_wage: args.hourly_wage,
                    build_duration_years: args.build_years,
                    daily_management_hours: args.daily_management_hours,
                })?,
            };
            let valuation = value_property(
                &PropertyInputs {
                    sqft: args.sqft,
                    age_years: args.age,
                    tier,
                    land_size_acres: args.land_acres,
                    land_price_per_acre: args.land_price_per_acre,
                    land_prep_cost: args.land_prep_cost,
                    opportunity_cost,
                },
                &TierTable::default(),
            )?;
            if args.json {
                write_json(out, &valuation)?;
            } else {
                write!(out, "{}", report::render_valuation(&valuation))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
fn scenario_from_json(json: &str) -> Result<Scenario, String> {
    let overrides = serde_json::from_str::<ScenarioOverrides>(json)
        .map_err(|e| format!("Invalid scenario JSON: {e}"))?;
    let mut settings = default_settings();
    apply_overrides(&mut settings, &overrides);
    build_scenario(&settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rentbuy").chain(args.iter().copied()))
            .expect("args should parse")
    }

    fn run_to_string(args: &[&str]) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(parse(args), &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn defaults_round_trip_to_library_scenario() {
        let scenario = build_scenario(&default_settings()).expect("valid defaults");
        let base = Scenario::default();
        assert_approx(scenario.down_payment_fraction, base.down_payment_fraction);
        assert_approx(scenario.mortgage_rate, base.mortgage_rate);
        assert_approx(scenario.closing_cost_fraction, 0.03);
        assert_approx(scenario.selling_cost_fraction, 0.06);
        assert_approx(scenario.investment_return_rate, 0.08);
        assert_eq!(scenario.horizon_years, 30);
    }

    #[test]
    fn scenario_json_uses_percent_and_camel_case() {
        let json = r#"{
          "homePrice": 369900,
          "downPayment": 3.5,
          "mortgageRate": 7,
          "closingCost": 0,
          "investmentReturnRate": 10,
          "horizonYears": 25
        }"#;
        let scenario = scenario_from_json(json).expect("json should parse");
        assert_approx(scenario.home_price, 369_900.0);
        assert_approx(scenario.down_payment_fraction, 0.035);
        assert_approx(scenario.mortgage_rate, 0.07);
        assert_approx(scenario.closing_cost_fraction, 0.0);
        assert_approx(scenario.investment_return_rate, 0.10);
        assert_eq!(scenario.horizon_years, 25);
        assert_eq!(scenario.loan_term_years, 30);
    }

    #[test]
    fn scenario_json_rejects_unknown_keys() {
        let err = scenario_from_json(r#"{"householdIncome": 150000}"#)
            .expect_err("unknown key must fail");
        assert!(err.contains("householdIncome"));
    }

    #[test]
    fn build_scenario_rejects_zero_horizon() {
        let mut settings = default_settings();
        settings.horizon_years = 0;
        let err = build_scenario(&settings).expect_err("must reject zero horizon");
        assert!(err.contains("--horizon-years"));
    }

    #[test]
    fn build_scenario_rejects_down_payment_above_hundred() {
        let mut settings = default_settings();
        settings.down_payment = 120.0;
        let err = build_scenario(&settings).expect_err("must reject >100% down");
        assert!(err.contains("--down-payment"));
    }

    #[test]
    fn build_scenario_rejects_negative_rate() {
        let mut settings = default_settings();
        settings.rent_increase_rate = -1.0;
        let err = build_scenario(&settings).expect_err("must reject negative rate");
        assert!(err.contains("--rent-increase-rate"));
    }

    #[test]
    fn flags_override_scenario_file() {
        let path = std::env::temp_dir().join(format!(
            "rentbuy-scenario-{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{"mortgageRate": 7, "monthlyRent": 2000}"#)
            .expect("write scenario file");
        let path_arg = path.to_string_lossy().into_owned();

        let cli = parse(&[
            "--scenario",
            &path_arg,
            "--mortgage-rate",
            "5.5",
            "simulate",
        ]);
        let scenario = resolve_scenario(&cli).expect("valid scenario");
        let _ = fs::remove_file(&path);

        assert_approx(scenario.mortgage_rate, 0.055);
        assert_approx(scenario.monthly_rent, 2_000.0);
    }

    #[test]
    fn missing_scenario_file_names_the_path() {
        let cli = parse(&["--scenario", "/nonexistent/rentbuy.json", "simulate"]);
        let err = resolve_scenario(&cli).expect_err("missing file must fail");
        assert!(matches!(err, CliError::ReadScenario { .. }));
        assert!(err.to_string().contains("/nonexistent/rentbuy.json"));
    }

    #[test]
    fn range_spec_must_have_three_parts() {
        let err = parse_range("1:8", "--range").expect_err("two parts");
        assert!(err.to_string().contains("start:stop:step"));
        let err = parse_range("1:x:1", "--range").expect_err("bad number");
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn rate_sweep_values_are_converted_from_percent() {
        let values =
            sweep_values(SweepParam::MortgageRate, "1:8:1", "--range").expect("valid range");
        assert_eq!(values, vec![0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07]);

        let prices = sweep_values(SweepParam::HomePrice, "300000:400001:50000", "--range")
            .expect("valid range");
        assert_eq!(prices, vec![300_000.0, 350_000.0, 400_000.0]);
    }

    #[test]
    fn simulate_prints_break_even_report() {
        let text = run_to_string(&["--closing-cost", "0", "simulate"]).expect("runs");
        assert!(text.contains("Break-even year (with opportunity cost): 11"));
    }

    #[test]
    fn simulate_json_contains_all_years() {
        let text = run_to_string(&["simulate", "--json", "--closing-cost", "0"]).expect("runs");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["years"].as_array().map(Vec::len), Some(30));
        assert_eq!(value["breakEvenYear"], serde_json::json!(11));
    }

    #[test]
    fn sweep_1d_matches_library_sweep() {
        let text = run_to_string(&[
            "--closing-cost",
            "0",
            "--investment-return-rate",
            "10",
            "sweep-1d",
            "--param",
            "mortgage-rate",
            "--range",
            "1:8:1",
            "--json",
        ])
        .expect("runs");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(
            value["breakEvenYears"],
            serde_json::json!([2, 3, 3, 4, 7, 14, 31])
        );
    }

    #[test]
    fn sweep_1d_coupling_can_be_disabled() {
        let args = |couple: &'static str| {
            vec![
                "--closing-cost",
                "0",
                "--investment-return-rate",
                "10",
                "sweep-1d",
                "--param",
                "rent-increase-rate",
                "--range",
                "4:7:1",
                "--couple-appreciation",
                couple,
                "--json",
            ]
        };
        let coupled = run_to_string(&args("true")).expect("runs");
        let plain = run_to_string(&args("false")).expect("runs");
        let coupled: serde_json::Value = serde_json::from_str(&coupled).expect("valid json");
        let plain: serde_json::Value = serde_json::from_str(&plain).expect("valid json");
        assert_eq!(coupled["breakEvenYears"], serde_json::json!([8, 5, 4]));
        assert_eq!(plain["breakEvenYears"], serde_json::json!([11, 9, 8]));
    }

    #[test]
    fn sweep_2d_renders_heatmap_labels() {
        let text = run_to_string(&[
            "--closing-cost",
            "0",
            "--investment-return-rate",
            "10",
            "sweep-2d",
            "--rows",
            "home-price",
            "--row-range",
            "300000:600001:140000",
            "--cols",
            "mortgage-rate",
            "--col-range",
            "3:8:2",
        ])
        .expect("runs");
        assert!(text.contains("$300k"));
        assert!(text.contains("$440k"));
        assert!(text.contains("7.00%"));
    }

    #[test]
    fn sweep_2d_rejects_same_axis_twice() {
        let err = run_to_string(&[
            "sweep-2d",
            "--rows",
            "mortgage-rate",
            "--row-range",
            "1:3:1",
            "--cols",
            "mortgage-rate",
            "--col-range",
            "1:3:1",
        ])
        .expect_err("same axis");
        assert!(err.to_string().contains("--rows"));
    }

    #[test]
    fn valuation_rejects_unknown_tier() {
        let err = run_to_string(&[
            "valuation",
            "--sqft",
            "2500",
            "--age",
            "5",
            "--tier",
            "luxury",
            "--land-acres",
            "12.5",
            "--land-price-per-acre",
            "6000",
        ])
        .expect_err("unknown tier");
        assert!(matches!(
            err,
            CliError::Valuation(ValuationError::InvalidTier { .. })
        ));
    }

    #[test]
    fn valuation_computes_opportunity_cost_from_build_flags() {
        let text = run_to_string(&[
            "valuation",
            "--sqft",
            "2500",
            "--age",
            "5",
            "--tier",
            "mid",
            "--land-acres",
            "12.5",
            "--land-price-per-acre",
            "6000",
            "--land-prep-cost",
            "50000",
            "--build-rent-per-month",
            "2500",
            "--hourly-wage",
            "50",
            "--build-years",
            "2",
            "--daily-management-hours",
            "1",
            "--json",
        ])
        .expect("runs");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["opportunityCost"], serde_json::json!(96_500.0));
        assert_eq!(value["tier"], serde_json::json!("mid"));
        assert_eq!(value["schemaVersion"], serde_json::json!(1));
    }
}
