use super::error::ScenarioError;
use super::mortgage::Loan;
use super::types::{Scenario, Trajectory, YearRecord};

/// State-and-local tax portion of itemized deductions is capped at this amount.
pub const SALT_DEDUCTION_CAP: f64 = 10_000.0;

#[derive(Debug, Clone, Copy)]
struct TaxYear {
    property_tax: f64,
    maintenance: f64,
    tax_savings: f64,
}

/// Cumulative ownership-side and renter-side state carried across years.
#[derive(Debug)]
struct Ledger {
    cumulative_ownership_cost: f64,
    equity_built: f64,
    monthly_rent: f64,
    cumulative_rent_cost: f64,
    investment_balance: f64,
}

/// Year-by-year buy-vs-rent comparison with the renter investing both the
/// upfront cash and any yearly surplus of owning over renting.
pub fn simulate(scenario: &Scenario) -> Result<Trajectory, ScenarioError> {
    scenario.validate()?;

    let down_payment = scenario.home_price * scenario.down_payment_fraction;
    let loan_amount = scenario.home_price - down_payment;
    let closing_cost = scenario.home_price * scenario.closing_cost_fraction;
    let mut loan = Loan::new(
        loan_amount,
        scenario.mortgage_rate,
        scenario.loan_term_years,
    );
    let monthly_payment = loan.payment();

    let mut ledger = Ledger {
        cumulative_ownership_cost: closing_cost,
        equity_built: 0.0,
        monthly_rent: scenario.monthly_rent,
        cumulative_rent_cost: 0.0,
        investment_balance: down_payment + closing_cost,
    };

    let mut years = Vec::with_capacity(scenario.horizon_years as usize);
    let mut break_even_year = None;

    for year in 1..=scenario.horizon_years {
        let amortized = loan.amortize_year();
        ledger.equity_built += amortized.principal;

        let taxes = tax_year(scenario, amortized.interest);
        let annual_ownership_cost = 12.0 * monthly_payment
            + taxes.maintenance
            + taxes.property_tax
            - taxes.tax_savings;
        ledger.cumulative_ownership_cost += annual_ownership_cost;

        let home_value = scenario.home_price
            * (1.0 + scenario.home_appreciation_rate).powf(f64::from(year));
        let selling_cost = home_value * scenario.selling_cost_fraction;
        let net_cost_of_buying = ledger.cumulative_ownership_cost - ledger.equity_built
            - (home_value - scenario.home_price)
            + selling_cost;

        let annual_rent = 12.0 * ledger.monthly_rent;
        ledger.cumulative_rent_cost += annual_rent;
        ledger.monthly_rent *= 1.0 + scenario.rent_increase_rate;

        // Only a surplus of owning over renting is invested; a deficit is not withdrawn.
        let savings = (annual_ownership_cost - annual_rent).max(0.0);
        ledger.investment_balance =
            (ledger.investment_balance + savings) * (1.0 + scenario.investment_return_rate);

        let record = YearRecord {
            year,
            interest_paid: amortized.interest,
            principal_paid: amortized.principal,
            cumulative_ownership_cost: ledger.cumulative_ownership_cost,
            equity_built: ledger.equity_built,
            home_value,
            selling_cost,
            net_cost_of_buying,
            annual_rent,
            cumulative_rent_cost: ledger.cumulative_rent_cost,
            investment_balance: ledger.investment_balance,
            tax_savings: taxes.tax_savings,
        };

        if break_even_year.is_none() && record.owning_is_cheaper() {
            tracing::debug!(year, net_cost_of_buying, "break-even year latched");
            break_even_year = Some(year);
        }
        years.push(record);
    }

    Ok(Trajectory {
        down_payment,
        loan_amount,
        monthly_payment,
        closing_cost,
        years,
        break_even_year,
    })
}

// Property tax and maintenance are charged on the purchase price, not the
// appreciated value.
fn tax_year(scenario: &Scenario, annual_interest: f64) -> TaxYear {
    let maintenance = scenario.home_price * scenario.maintenance_rate;
    let property_tax = scenario.home_price * scenario.property_tax_rate;
    let itemized = annual_interest + property_tax.min(SALT_DEDUCTION_CAP);
    let deductible = (itemized - scenario.standard_deduction).max(0.0);
    TaxYear {
        property_tax,
        maintenance,
        tax_savings: deductible * scenario.marginal_tax_rate,
    }
}
