mod engine;
mod error;
mod mortgage;
mod sweep;
mod types;
mod valuation;

pub use engine::{SALT_DEDUCTION_CAP, simulate};
pub use error::{Constraint, FieldViolation, ScenarioError, SweepError, ValuationError};
pub use mortgage::{Loan, YearAmortization, monthly_payment};
pub use sweep::{ParamRange, apply_param, sweep_1d, sweep_2d};
pub use types::{
    BreakEvenRule, DEFAULT_CLOSING_COST_FRACTION, DEFAULT_INVESTMENT_RETURN_RATE,
    DEFAULT_SELLING_COST_FRACTION, ParamUnit, Scenario, SweepGrid, SweepOptions, SweepParam,
    SweepSeries, Trajectory, YearRecord,
};
pub use valuation::{
    BuildOpportunityInputs, PropertyInputs, PropertyValuation, Tier, TierParams, TierTable,
    VALUATION_SCHEMA_VERSION, build_opportunity_cost, value_property,
};
