use serde::Serialize;

use super::engine::simulate;
use super::error::SweepError;
use super::types::{Scenario, SweepGrid, SweepOptions, SweepParam, SweepSeries};

/// Half-open `start + i*step < stop` range of sweep values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn values(&self, param: SweepParam) -> Result<Vec<f64>, SweepError> {
        let invalid = |reason: &str| SweepError::InvalidRange {
            param,
            reason: reason.to_string(),
        };

        if !self.start.is_finite() || !self.stop.is_finite() || !self.step.is_finite() {
            return Err(invalid("bounds and step must be finite"));
        }
        if self.step <= 0.0 {
            return Err(invalid("step must be > 0"));
        }
        if self.stop <= self.start {
            return Err(invalid("stop must be > start"));
        }

        // Values within a hair of `stop` are rounding artefacts of the last step.
        let limit = self.stop - self.step * 1e-9;
        let count = ((self.stop - self.start) / self.step).ceil() as usize;
        Ok((0..count)
            .map(|i| self.start + i as f64 * self.step)
            .filter(|v| *v < limit)
            .collect())
    }
}

const SWEEP_1D_COUPLES_BY_DEFAULT: bool = true;
const SWEEP_2D_COUPLES_BY_DEFAULT: bool = false;

/// Point scenario for one sweep cell; only the swept fields change, plus home
/// appreciation when `couple` is set and `param` is rent growth.
pub fn apply_param(base: &Scenario, param: SweepParam, value: f64, couple: bool) -> Scenario {
    let mut scenario = *base;
    assign(&mut scenario, param, value, couple);
    scenario
}

fn assign(scenario: &mut Scenario, param: SweepParam, value: f64, couple: bool) {
    if param == SweepParam::RentIncreaseRate && couple {
        SweepParam::HomeAppreciationRate.set(scenario, value);
    }
    param.set(scenario, value);
}

fn break_even_or_sentinel(
    scenario: &Scenario,
    param: SweepParam,
    value: f64,
    options: SweepOptions,
) -> Result<u32, SweepError> {
    let trajectory = simulate(scenario).map_err(|source| SweepError::Scenario {
        param,
        value,
        source,
    })?;
    Ok(trajectory
        .break_even_year_by(options.rule)
        .unwrap_or(scenario.horizon_years + 1))
}

/// Re-runs the simulator once per value of `param`. The result for a value
/// is its break-even year, or `horizon + 1` when owning never wins.
pub fn sweep_1d(
    base: &Scenario,
    param: SweepParam,
    values: &[f64],
    options: SweepOptions,
) -> Result<SweepSeries, SweepError> {
    if values.is_empty() {
        return Err(SweepError::EmptyValues { param });
    }
    let couple = options.couples_appreciation(SWEEP_1D_COUPLES_BY_DEFAULT);
    tracing::info!(%param, points = values.len(), couple, "starting 1d sweep");

    let mut break_even_years = Vec::with_capacity(values.len());
    for &value in values {
        let scenario = apply_param(base, param, value, couple);
        let year = break_even_or_sentinel(&scenario, param, value, options)?;
        tracing::debug!(%param, value, year, "sweep point");
        break_even_years.push(year);
    }

    tracing::info!(%param, "1d sweep complete");
    Ok(SweepSeries {
        param,
        values: values.to_vec(),
        break_even_years,
    })
}

/// Row-major grid: outer loop over `row_param`, inner over `col_param`.
/// Each cell is the base scenario with just the two axis values substituted
/// unless coupling is requested explicitly.
pub fn sweep_2d(
    base: &Scenario,
    row_param: SweepParam,
    row_values: &[f64],
    col_param: SweepParam,
    col_values: &[f64],
    options: SweepOptions,
) -> Result<SweepGrid, SweepError> {
    if row_values.is_empty() {
        return Err(SweepError::EmptyValues { param: row_param });
    }
    if col_values.is_empty() {
        return Err(SweepError::EmptyValues { param: col_param });
    }
    let couple = options.couples_appreciation(SWEEP_2D_COUPLES_BY_DEFAULT);
    tracing::info!(
        %row_param,
        %col_param,
        points = row_values.len() * col_values.len(),
        couple,
        "starting 2d sweep"
    );

    let mut break_even_years = Vec::with_capacity(row_values.len());
    for &row_value in row_values {
        let mut row = Vec::with_capacity(col_values.len());
        for &col_value in col_values {
            let mut scenario = *base;
            assign(&mut scenario, row_param, row_value, couple);
            assign(&mut scenario, col_param, col_value, couple);
            let year = break_even_or_sentinel(&scenario, col_param, col_value, options)
                .map_err(|err| attribute_row(err, row_param, row_value))?;
            row.push(year);
        }
        break_even_years.push(row);
    }

    tracing::info!(%row_param, %col_param, "2d sweep complete");
    Ok(SweepGrid {
        row_param,
        col_param,
        row_values: row_values.to_vec(),
        col_values: col_values.to_vec(),
        break_even_years,
    })
}

// Validation reports the column value; blame the row value instead when
// only the row field is at fault.
fn attribute_row(err: SweepError, row_param: SweepParam, row_value: f64) -> SweepError {
    match err {
        SweepError::Scenario {
            param,
            value,
            source,
        } => {
            let names_field = |name: &str| source.violations().iter().any(|v| v.field == name);
            if names_field(row_param.name()) && !names_field(param.name()) {
                SweepError::Scenario {
                    param: row_param,
                    value: row_value,
                    source,
                }
            } else {
                SweepError::Scenario {
                    param,
                    value,
                    source,
                }
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BreakEvenRule;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn base_scenario() -> Scenario {
        Scenario {
            closing_cost_fraction: 0.0,
            investment_return_rate: 0.10,
            ..Scenario::default()
        }
    }

    fn percents(values: &[u32]) -> Vec<f64> {
        values.iter().map(|v| *v as f64 / 100.0).collect()
    }

    #[test]
    fn range_is_half_open_and_drift_free() {
        let range = ParamRange {
            start: 0.01,
            stop: 0.08,
            step: 0.01,
        };
        let values = range.values(SweepParam::MortgageRate).expect("valid range");
        assert_eq!(values.len(), 7);
        assert!((values[6] - 0.07).abs() < 1e-12);

        let prices = ParamRange {
            start: 300_000.0,
            stop: 751_000.0,
            step: 50_000.0,
        };
        let values = prices.values(SweepParam::HomePrice).expect("valid range");
        assert_eq!(values.first(), Some(&300_000.0));
        assert_eq!(values.last(), Some(&750_000.0));
        assert_eq!(values.len(), 10);
    }

    #[test]
    fn range_rejects_bad_step_and_empty_span() {
        let zero_step = ParamRange {
            start: 0.0,
            stop: 1.0,
            step: 0.0,
        };
        assert!(matches!(
            zero_step.values(SweepParam::MortgageRate),
            Err(SweepError::InvalidRange { .. })
        ));

        let empty = ParamRange {
            start: 1.0,
            stop: 1.0,
            step: 0.1,
        };
        let err = empty
            .values(SweepParam::MortgageRate)
            .expect_err("must reject empty span");
        assert!(err.to_string().contains("mortgage_rate"));
    }

    #[test]
    fn mortgage_rate_sweep_matches_reference_years() {
        let values = percents(&[1, 2, 3, 4, 5, 6, 7]);
        let series = sweep_1d(
            &base_scenario(),
            SweepParam::MortgageRate,
            &values,
            SweepOptions::default(),
        )
        .expect("valid sweep");

        assert_eq!(series.values, values);
        assert_eq!(series.break_even_years, vec![2, 3, 3, 4, 7, 14, 31]);
    }

    #[test]
    fn rent_growth_sweep_couples_appreciation_when_enabled() {
        let values = percents(&[0, 1, 2, 3, 4, 5, 6]);
        let coupled = sweep_1d(
            &base_scenario(),
            SweepParam::RentIncreaseRate,
            &values,
            SweepOptions::default(),
        )
        .expect("valid sweep");
        let plain = sweep_1d(
            &base_scenario(),
            SweepParam::RentIncreaseRate,
            &values,
            SweepOptions {
                couple_appreciation_to_rent_growth: Some(false),
                ..SweepOptions::default()
            },
        )
        .expect("valid sweep");

        assert_eq!(coupled.break_even_years, vec![31, 31, 31, 14, 8, 5, 4]);
        assert_eq!(plain.break_even_years, vec![31, 31, 31, 14, 11, 9, 8]);
        assert_ne!(coupled.break_even_years, plain.break_even_years);
    }

    #[test]
    fn coupling_only_touches_rent_growth_assignments() {
        let base = base_scenario();

        let coupled = apply_param(&base, SweepParam::RentIncreaseRate, 0.05, true);
        assert_eq!(coupled.rent_increase_rate, 0.05);
        assert_eq!(coupled.home_appreciation_rate, 0.05);

        let other = apply_param(&base, SweepParam::MortgageRate, 0.05, true);
        assert_eq!(other.home_appreciation_rate, base.home_appreciation_rate);
        assert_eq!(other.rent_increase_rate, base.rent_increase_rate);
    }

    #[test]
    fn grid_is_row_major_with_sentinels() {
        let grid = sweep_2d(
            &base_scenario(),
            SweepParam::HomePrice,
            &[300_000.0, 440_000.0, 600_000.0],
            SweepParam::MortgageRate,
            &percents(&[3, 5, 7]),
            SweepOptions::default(),
        )
        .expect("valid sweep");

        assert_eq!(
            grid.break_even_years,
            vec![vec![2, 3, 3], vec![3, 7, 31], vec![9, 31, 31]]
        );
    }

    #[test]
    fn grid_with_default_options_substitutes_only_axis_values() {
        let options = SweepOptions::default();
        let grid = sweep_2d(
            &base_scenario(),
            SweepParam::RentIncreaseRate,
            &[0.05],
            SweepParam::MortgageRate,
            &[0.06],
            options,
        )
        .expect("valid sweep");

        let plain = Scenario {
            rent_increase_rate: 0.05,
            mortgage_rate: 0.06,
            ..base_scenario()
        };
        let expected = simulate(&plain).expect("valid scenario").break_even_year;
        assert_eq!(expected, Some(9));
        assert_eq!(grid.break_even_years, vec![vec![9]]);

        let coupled = sweep_2d(
            &base_scenario(),
            SweepParam::RentIncreaseRate,
            &[0.05],
            SweepParam::MortgageRate,
            &[0.06],
            SweepOptions {
                couple_appreciation_to_rent_growth: Some(true),
                ..options
            },
        )
        .expect("valid sweep");
        assert_eq!(coupled.break_even_years, vec![vec![5]]);
    }

    #[test]
    fn sentinel_tracks_swept_horizon() {
        let scenario = Scenario {
            mortgage_rate: 0.07,
            ..base_scenario()
        };
        let series = sweep_1d(
            &scenario,
            SweepParam::HorizonYears,
            &[5.0, 10.0],
            SweepOptions::default(),
        )
        .expect("valid sweep");
        assert_eq!(series.break_even_years, vec![6, 11]);
    }

    #[test]
    fn sweep_aborts_on_first_invalid_point() {
        let err = sweep_1d(
            &base_scenario(),
            SweepParam::HorizonYears,
            &[10.0, 0.0, 20.0],
            SweepOptions::default(),
        )
        .expect_err("must abort on zero horizon");
        match err {
            SweepError::Scenario { param, value, .. } => {
                assert_eq!(param, SweepParam::HorizonYears);
                assert_eq!(value, 0.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn grid_blames_the_invalid_row_value() {
        let err = sweep_2d(
            &base_scenario(),
            SweepParam::DownPaymentFraction,
            &[0.1, 1.5],
            SweepParam::MortgageRate,
            &[0.05],
            SweepOptions::default(),
        )
        .expect_err("must reject down payment above 100%");
        assert!(matches!(
            err,
            SweepError::Scenario {
                param: SweepParam::DownPaymentFraction,
                value,
                ..
            } if value == 1.5
        ));
    }

    #[test]
    fn empty_values_are_rejected() {
        let err = sweep_1d(
            &base_scenario(),
            SweepParam::MortgageRate,
            &[],
            SweepOptions::default(),
        )
        .expect_err("must reject empty sweep");
        assert_eq!(
            err,
            SweepError::EmptyValues {
                param: SweepParam::MortgageRate
            }
        );
    }

    #[test]
    fn sustained_rule_reports_never_for_transient_dip() {
        let scenario = Scenario {
            down_payment_fraction: 0.2,
            rent_increase_rate: 0.02,
            investment_return_rate: 0.12,
            ..Scenario::default()
        };
        let first = sweep_1d(
            &scenario,
            SweepParam::MortgageRate,
            &[0.0],
            SweepOptions::default(),
        )
        .expect("valid sweep");
        let sustained = sweep_1d(
            &scenario,
            SweepParam::MortgageRate,
            &[0.0],
            SweepOptions {
                rule: BreakEvenRule::Sustained,
                ..SweepOptions::default()
            },
        )
        .expect("valid sweep");

        assert_eq!(first.break_even_years, vec![8]);
        assert_eq!(sustained.break_even_years, vec![31]);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_sentinel_iff_no_break_even(
            rate_bp in 0u32..1_200,
            rent in 800u32..6_000,
            horizon in 1u32..41
        ) {
            let base = Scenario {
                monthly_rent: rent as f64,
                horizon_years: horizon,
                ..base_scenario()
            };
            let rate = rate_bp as f64 / 10_000.0;
            let series = sweep_1d(&base, SweepParam::MortgageRate, &[rate], SweepOptions::default())
                .expect("valid sweep");
            let trajectory = simulate(&apply_param(&base, SweepParam::MortgageRate, rate, false))
                .expect("valid scenario");
            let expected = trajectory.break_even_year.unwrap_or(horizon + 1);
            prop_assert_eq!(series.break_even_years[0], expected);
            prop_assert_eq!(series.break_even_years[0] == horizon + 1, trajectory.break_even_year.is_none());
        }
    }
}
