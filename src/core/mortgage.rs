/// Constant monthly payment that retires `principal` over `term_years * 12`
/// payments at `annual_rate / 12` per month. Callers guarantee `term_years > 0`.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_years: u32) -> f64 {
    let monthly_rate = annual_rate / 12.0;
    let n_payments = f64::from(term_years) * 12.0;
    if monthly_rate == 0.0 {
        return principal / n_payments;
    }
    let growth = (1.0 + monthly_rate).powf(n_payments);
    if growth.is_infinite() {
        // Limit of the annuity formula as the term grows: interest only.
        return principal * monthly_rate;
    }
    principal * (monthly_rate * growth) / (growth - 1.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearAmortization {
    pub interest: f64,
    pub principal: f64,
}

/// Month-by-month amortization of a fixed-payment loan. The payment keeps
/// being applied after the term, driving the balance below zero.
#[derive(Debug, Clone)]
pub struct Loan {
    balance: f64,
    monthly_rate: f64,
    payment: f64,
}

impl Loan {
    pub fn new(principal: f64, annual_rate: f64, term_years: u32) -> Self {
        Self {
            balance: principal,
            monthly_rate: annual_rate / 12.0,
            payment: monthly_payment(principal, annual_rate, term_years),
        }
    }

    pub fn payment(&self) -> f64 {
        self.payment
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Applies twelve monthly payments.
    pub fn amortize_year(&mut self) -> YearAmortization {
        let mut year = YearAmortization::default();
        for _ in 0..12 {
            let interest = self.balance * self.monthly_rate;
            let principal = self.payment - interest;
            year.interest += interest;
            year.principal += principal;
            self.balance -= principal;
        }
        year
    }
}
