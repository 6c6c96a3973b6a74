use crate::schema::{ChangeResult, Trend};

/// `value` as a percentage of `base`.
///
/// `None` when either side is missing, when `base` is not a positive finite
/// number, or when the result would not be finite.
pub fn percent_of_base(value: Option<f64>, base: Option<f64>) -> Option<f64> {
    let value = value?;
    let base = base?;

    if !value.is_finite() || !base.is_finite() || base <= 0.0 {
        return None;
    }

    let pct = value / base * 100.0;
    pct.is_finite().then_some(pct)
}

/// Period-over-period change of `current` against `previous`.
///
/// Incomparable inputs (either side missing or non-finite, `previous == 0`)
/// give an empty result with `Trend::Same`. The percentage is taken against
/// `|previous|` so its sign always follows the delta.
pub fn change_from(current: Option<f64>, previous: Option<f64>) -> ChangeResult {
    let (current, previous) = match (current, previous) {
        (Some(c), Some(p)) if c.is_finite() && p.is_finite() && p != 0.0 => (c, p),
        _ => return ChangeResult::incomparable(),
    };

    let delta = current - previous;
    if !delta.is_finite() {
        return ChangeResult::incomparable();
    }

    let percentage = delta / previous.abs() * 100.0;

    ChangeResult {
        value: Some(delta),
        percentage: percentage.is_finite().then_some(percentage),
        trend: trend_of(delta),
    }
}

fn trend_of(delta: f64) -> Trend {
    if delta > 0.0 {
        Trend::Up
    } else if delta < 0.0 {
        Trend::Down
    } else {
        Trend::Same
    }
}

/// Canonical gross margin: `(revenue - cogs) / revenue * 100`.
///
/// Returns `(gross_profit, margin_pct)`, or `None` when revenue is not a
/// positive number.
pub fn gross_margin(revenue: f64, cogs: f64) -> Option<(f64, f64)> {
    if !revenue.is_finite() || !cogs.is_finite() || revenue <= 0.0 {
        return None;
    }

    let gross_profit = revenue - cogs;
    let margin_pct = percent_of_base(Some(gross_profit), Some(revenue))?;
    Some((gross_profit, margin_pct))
}
