use serde::{Deserialize, Serialize};

use super::error::{Constraint, FieldViolation, ScenarioError};

/// Inputs for one buy-vs-rent comparison. Rates are fractional annual figures.
///
/// Fields are public so sweeps can vary them; use [`Scenario::validated`] to
/// check a hand-built record up front. `simulate` re-validates every input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub home_price: f64,
    pub down_payment_fraction: f64,
    pub mortgage_rate: f64,
    pub loan_term_years: u32,
    pub property_tax_rate: f64,
    pub maintenance_rate: f64,
    pub home_appreciation_rate: f64,
    pub monthly_rent: f64,
    pub rent_increase_rate: f64,
    pub marginal_tax_rate: f64,
    pub standard_deduction: f64,
    pub horizon_years: u32,
    pub closing_cost_fraction: f64,
    pub selling_cost_fraction: f64,
    pub investment_return_rate: f64,
}

pub const DEFAULT_CLOSING_COST_FRACTION: f64 = 0.03;
pub const DEFAULT_SELLING_COST_FRACTION: f64 = 0.06;
pub const DEFAULT_INVESTMENT_RETURN_RATE: f64 = 0.08;

impl Default for Scenario {
    fn default() -> Self {
        Self {
            home_price: 440_000.0,
            down_payment_fraction: 0.05,
            mortgage_rate: 0.06,
            loan_term_years: 30,
            property_tax_rate: 0.0058,
            maintenance_rate: 0.01,
            home_appreciation_rate: 0.03,
            monthly_rent: 2_300.0,
            rent_increase_rate: 0.03,
            marginal_tax_rate: 0.24,
            standard_deduction: 29_200.0,
            horizon_years: 30,
            closing_cost_fraction: DEFAULT_CLOSING_COST_FRACTION,
            selling_cost_fraction: DEFAULT_SELLING_COST_FRACTION,
            investment_return_rate: DEFAULT_INVESTMENT_RETURN_RATE,
        }
    }
}

impl Scenario {
    /// Returns the scenario unchanged if [`Scenario::validate`] accepts it.
    pub fn validated(self) -> Result<Self, ScenarioError> {
        self.validate()?;
        Ok(self)
    }

    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut violations = Vec::new();

        if self.horizon_years == 0 {
            violations.push(FieldViolation {
                field: "horizon_years",
                constraint: Constraint::Positive,
            });
        }
        if self.loan_term_years == 0 {
            violations.push(FieldViolation {
                field: "loan_term_years",
                constraint: Constraint::Positive,
            });
        }

        for param in SweepParam::ALL {
            if param.unit() == ParamUnit::Years {
                continue;
            }
            let value = param.get(self);
            if !value.is_finite() || value < 0.0 {
                violations.push(FieldViolation {
                    field: param.name(),
                    constraint: Constraint::FiniteNonNegative,
                });
            }
        }

        if self.down_payment_fraction > 1.0 {
            violations.push(FieldViolation {
                field: "down_payment_fraction",
                constraint: Constraint::AtMostOne,
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::Invalid { violations })
        }
    }
}

/// One simulated year. `year` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: u32,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub cumulative_ownership_cost: f64,
    pub equity_built: f64,
    pub home_value: f64,
    pub selling_cost: f64,
    pub net_cost_of_buying: f64,
    pub annual_rent: f64,
    pub cumulative_rent_cost: f64,
    pub investment_balance: f64,
    pub tax_savings: f64,
}

impl YearRecord {
    /// Rent paid so far, less what the renter's invested capital is worth.
    pub fn opportunity_adjusted_rent_cost(&self) -> f64 {
        self.cumulative_rent_cost - self.investment_balance
    }

    pub fn owning_is_cheaper(&self) -> bool {
        self.net_cost_of_buying < self.opportunity_adjusted_rent_cost()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trajectory {
    pub down_payment: f64,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub closing_cost: f64,
    pub years: Vec<YearRecord>,
    /// First year owning was cheaper, latched on first touch.
    pub break_even_year: Option<u32>,
}

impl Trajectory {
    pub fn horizon_years(&self) -> u32 {
        self.years.len() as u32
    }

    /// Earliest year from which owning stays cheaper through the final year.
    pub fn sustained_break_even_year(&self) -> Option<u32> {
        let mut sustained = None;
        for record in self.years.iter().rev() {
            if !record.owning_is_cheaper() {
                break;
            }
            sustained = Some(record.year);
        }
        sustained
    }

    pub fn break_even_year_by(&self, rule: BreakEvenRule) -> Option<u32> {
        match rule {
            BreakEvenRule::FirstCrossing => self.break_even_year,
            BreakEvenRule::Sustained => self.sustained_break_even_year(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakEvenRule {
    #[default]
    FirstCrossing,
    Sustained,
}

/// Scenario fields a sweep can vary.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SweepParam {
    HomePrice,
    DownPaymentFraction,
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
    ClosingCostFraction,
    SellingCostFraction,
    InvestmentReturnRate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParamUnit {
    Dollars,
    Rate,
    Years,
}

impl SweepParam {
    pub const ALL: [SweepParam; 15] = [
        SweepParam::HomePrice,
        SweepParam::DownPaymentFraction,
        SweepParam::MortgageRate,
        SweepParam::LoanTermYears,
        SweepParam::PropertyTaxRate,
        SweepParam::MaintenanceRate,
        SweepParam::HomeAppreciationRate,
        SweepParam::MonthlyRent,
        SweepParam::RentIncreaseRate,
        SweepParam::MarginalTaxRate,
        SweepParam::StandardDeduction,
        SweepParam::HorizonYears,
        SweepParam::ClosingCostFraction,
        SweepParam::SellingCostFraction,
        SweepParam::InvestmentReturnRate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepParam::HomePrice => "home_price",
            SweepParam::DownPaymentFraction => "down_payment_fraction",
            SweepParam::MortgageRate => "mortgage_rate",
            SweepParam::LoanTermYears => "loan_term_years",
            SweepParam::PropertyTaxRate => "property_tax_rate",
            SweepParam::MaintenanceRate => "maintenance_rate",
            SweepParam::HomeAppreciationRate => "home_appreciation_rate",
            SweepParam::MonthlyRent => "monthly_rent",
            SweepParam::RentIncreaseRate => "rent_increase_rate",
            SweepParam::MarginalTaxRate => "marginal_tax_rate",
            SweepParam::StandardDeduction => "standard_deduction",
            SweepParam::HorizonYears => "horizon_years",
            SweepParam::ClosingCostFraction => "closing_cost_fraction",
            SweepParam::SellingCostFraction => "selling_cost_fraction",
            SweepParam::InvestmentReturnRate => "investment_return_rate",
        }
    }

    pub fn unit(self) -> ParamUnit {
        match self {
            SweepParam::HomePrice | SweepParam::MonthlyRent | SweepParam::StandardDeduction => {
                ParamUnit::Dollars
            }
            SweepParam::LoanTermYears | SweepParam::HorizonYears => ParamUnit::Years,
            _ => ParamUnit::Rate,
        }
    }

    pub fn get(self, scenario: &Scenario) -> f64 {
        match self {
            SweepParam::HomePrice => scenario.home_price,
            SweepParam::DownPaymentFraction => scenario.down_payment_fraction,
            SweepParam::MortgageRate => scenario.mortgage_rate,
            SweepParam::LoanTermYears => f64::from(scenario.loan_term_years),
            SweepParam::PropertyTaxRate => scenario.property_tax_rate,
            SweepParam::MaintenanceRate => scenario.maintenance_rate,
            SweepParam::HomeAppreciationRate => scenario.home_appreciation_rate,
            SweepParam::MonthlyRent => scenario.monthly_rent,
            SweepParam::RentIncreaseRate => scenario.rent_increase_rate,
            SweepParam::MarginalTaxRate => scenario.marginal_tax_rate,
            SweepParam::StandardDeduction => scenario.standard_deduction,
            SweepParam::HorizonYears => f64::from(scenario.horizon_years),
            SweepParam::ClosingCostFraction => scenario.closing_cost_fraction,
            SweepParam::SellingCostFraction => scenario.selling_cost_fraction,
            SweepParam::InvestmentReturnRate => scenario.investment_return_rate,
        }
    }

    /// Writes `value` into the matching field. Year fields take the rounded
    /// value; negative or NaN values saturate to 0 and fail validation later.
    pub fn set(self, scenario: &mut Scenario, value: f64) {
        match self {
            SweepParam::HomePrice => scenario.home_price = value,
            SweepParam::DownPaymentFraction => scenario.down_payment_fraction = value,
            SweepParam::MortgageRate => scenario.mortgage_rate = value,
            SweepParam::LoanTermYears => scenario.loan_term_years = value.round() as u32,
            SweepParam::PropertyTaxRate => scenario.property_tax_rate = value,
            SweepParam::MaintenanceRate => scenario.maintenance_rate = value,
            SweepParam::HomeAppreciationRate => scenario.home_appreciation_rate = value,
            SweepParam::MonthlyRent => scenario.monthly_rent = value,
            SweepParam::RentIncreaseRate => scenario.rent_increase_rate = value,
            SweepParam::MarginalTaxRate => scenario.marginal_tax_rate = value,
            SweepParam::StandardDeduction => scenario.standard_deduction = value,
            SweepParam::HorizonYears => scenario.horizon_years = value.round() as u32,
            SweepParam::ClosingCostFraction => scenario.closing_cost_fraction = value,
            SweepParam::SellingCostFraction => scenario.selling_cost_fraction = value,
            SweepParam::InvestmentReturnRate => scenario.investment_return_rate = value,
        }
    }
}

impl std::fmt::Display for SweepParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepOptions {
    /// Mirror every rent-increase assignment into home appreciation. `None`
    /// takes the sweep's own default: coupled for `sweep_1d`, independent
    /// for `sweep_2d`.
    pub couple_appreciation_to_rent_growth: Option<bool>,
    pub rule: BreakEvenRule,
}

impl SweepOptions {
    pub fn couples_appreciation(&self, sweep_default: bool) -> bool {
        self.couple_appreciation_to_rent_growth.unwrap_or(sweep_default)
    }
}

/// Break-even year per swept value; `horizon + 1` means never.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSeries {
    pub param: SweepParam,
    pub values: Vec<f64>,
    pub break_even_years: Vec<u32>,
}

/// `break_even_years[i][j]` is the result for `row_values[i]`, `col_values[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepGrid {
    pub row_param: SweepParam,
    pub col_param: SweepParam,
    pub row_values: Vec<f64>,
    pub col_values: Vec<f64>,
    pub break_even_years: Vec<Vec<u32>>,
}
