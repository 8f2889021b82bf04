use std::io;

use tabled::{Table, builder::Builder};

use crate::core::{ParamUnit, PropertyValuation, SweepGrid, SweepParam, SweepSeries, Trajectory};

/// `$1,234.56`, with a leading minus for negatives.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Heatmap/series axis label: `$440k` for dollar fields, `6.00%` for rates.
pub fn format_axis_value(param: SweepParam, value: f64) -> String {
    match param.unit() {
        ParamUnit::Dollars => format!("${}k", (value / 1000.0).floor()),
        ParamUnit::Rate => format!("{:.2}%", value * 100.0),
        ParamUnit::Years => format!("{value:.0}"),
    }
}

pub fn axis_title(param: SweepParam) -> String {
    param
        .name()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn break_even_line(break_even_year: Option<u32>) -> String {
    match break_even_year {
        Some(year) => format!("Break-even year (with opportunity cost): {year}"),
        None => "Break-even year (with opportunity cost): Never within time horizon".to_string(),
    }
}

pub fn render_trajectory(trajectory: &Trajectory) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "Year",
        "Net Cost of Buying",
        "Opportunity-adjusted Rent",
        "Cumulative Rent Cost",
        "Investment Value",
        "Equity Built",
    ]);
    for record in &trajectory.years {
        builder.push_record([
            record.year.to_string(),
            format_currency(record.net_cost_of_buying),
            format_currency(record.opportunity_adjusted_rent_cost()),
            format_currency(record.cumulative_rent_cost),
            format_currency(record.investment_balance),
            format_currency(record.equity_built),
        ]);
    }

    let mut out = format!(
        "Loan {} at {}/month (down payment {}, closing cost {})\n{}\n{}\n",
        format_currency(trajectory.loan_amount),
        format_currency(trajectory.monthly_payment),
        format_currency(trajectory.down_payment),
        format_currency(trajectory.closing_cost),
        Table::from(builder),
        break_even_line(trajectory.break_even_year),
    );
    match trajectory.sustained_break_even_year() {
        Some(sustained) if trajectory.break_even_year != Some(sustained) => {
            out.push_str(&format!("Owning stays cheaper from year {sustained}\n"));
        }
        None if trajectory.break_even_year.is_some() => {
            out.push_str("Owning does not stay cheaper through the final year\n");
        }
        _ => {}
    }
    out
}

pub fn render_series(series: &SweepSeries) -> String {
    let mut builder = Builder::default();
    builder.push_record([axis_title(series.param), "Break-even Year".to_string()]);
    for (value, year) in series.values.iter().zip(&series.break_even_years) {
        builder.push_record([format_axis_value(series.param, *value), year.to_string()]);
    }

    format!(
        "Break-even Year vs {}\n{}\n(horizon + 1 = never breaks even)\n",
        axis_title(series.param),
        Table::from(builder),
    )
}

/// Annotated text heatmap, rows down and columns across.
pub fn render_grid(grid: &SweepGrid) -> String {
    let mut builder = Builder::default();
    let mut header = vec![format!(
        "{} \\ {}",
        axis_title(grid.row_param),
        axis_title(grid.col_param)
    )];
    header.extend(
        grid.col_values
            .iter()
            .map(|v| format_axis_value(grid.col_param, *v)),
    );
    builder.push_record(header);

    for (row_value, row) in grid.row_values.iter().zip(&grid.break_even_years) {
        let mut record = vec![format_axis_value(grid.row_param, *row_value)];
        record.extend(row.iter().map(ToString::to_string));
        builder.push_record(record);
    }

    format!(
        "Sensitivity Analysis: Break-even Year by {} and {}\n{}\n(horizon + 1 = never breaks even)\n",
        axis_title(grid.row_param),
        axis_title(grid.col_param),
        Table::from(builder),
    )
}

pub fn render_valuation(v: &PropertyValuation) -> String {
    format!(
        "Property Valuation Report
----------------------------
Structure:
  - Size: {sqft} sqft
  - Tier: {tier}
  - Price per Sqft: {price_per_sqft}
  - Initial Value: {initial}
  - Age: {age} years
  - Half-life: {half_life} years
  - Depreciation Factor: {factor:.4}
  - Current Value: {current}

Land:
  - Size: {acres} acres
  - Price per Acre: {price_per_acre}
  - Raw Land Value: {land_value}
  - Land Prep Cost: {prep}

Additional Costs:
  - Opportunity Cost: {opportunity}

--------------------------------------------
Total Estimated Market Value: {market}
Total Build Cost Basis: {basis}
Value Margin: {margin}
",
        sqft = v.sqft,
        tier = v.tier,
        price_per_sqft = format_currency(v.price_per_sqft),
        initial = format_currency(v.structure_initial_value),
        age = v.age_years,
        half_life = v.half_life_years,
        factor = v.depreciation_factor,
        current = format_currency(v.structure_current_value),
        acres = v.land_size_acres,
        price_per_acre = format_currency(v.land_price_per_acre),
        land_value = format_currency(v.land_value),
        prep = format_currency(v.land_prep_cost),
        opportunity = format_currency(v.opportunity_cost),
        market = format_currency(v.total_market_value),
        basis = format_currency(v.total_cost_basis),
        margin = format_currency(v.value_margin),
    )
}

/// One CSV row per simulated year, header taken from the record's fields.
pub fn write_trajectory_csv<W: io::Write>(
    writer: W,
    trajectory: &Trajectory,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in &trajectory.years {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
