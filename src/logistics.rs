use crate::schema::{LogisticsCostResult, LogisticsTariff};
use log::{debug, warn};
use std::fmt;

/// Currency amounts are displayed with kopeck precision.
pub const CURRENCY_DECIMALS: i32 = 2;

const CURRENCY_SYMBOL: &str = "₽";
const TOTAL_PREFIX: &str = "Total: ";

/// Rounds half away from zero to [`CURRENCY_DECIMALS`].
pub fn round_currency(amount: f64) -> f64 {
    let factor = 10f64.powi(CURRENCY_DECIMALS);
    (amount * factor).round() / factor
}

/// Package volume in liters from outer dimensions in centimeters.
pub fn volume_liters(length_cm: f64, width_cm: f64, height_cm: f64) -> f64 {
    let dims = [length_cm, width_cm, height_cm];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return 0.0;
    }

    let liters = length_cm * width_cm * height_cm / 1000.0;
    if liters.is_finite() {
        liters
    } else {
        0.0
    }
}

pub fn is_valid_tariff(tariff: &LogisticsTariff) -> bool {
    [tariff.base_rub, tariff.per_liter_rub, tariff.coefficient]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
}

/// Delivery cost of a box of `volume_liters` under `tariff`.
///
/// The first liter is always billed at the flat base rate, so anything up to
/// one liter costs exactly `base_rub * coefficient`. Each liter beyond the
/// first (fractions included) adds `per_liter_rub`. Non-positive volumes and
/// invalid tariffs yield an all-zero result.
pub fn calculate(volume_liters: f64, tariff: LogisticsTariff) -> LogisticsCostResult {
    if !is_valid_tariff(&tariff) {
        warn!("Ignoring invalid logistics tariff {:?}", tariff);
        return zero_cost(tariff);
    }

    if !volume_liters.is_finite() || volume_liters <= 0.0 {
        return zero_cost(tariff);
    }

    let additional_liters = (volume_liters - 1.0).max(0.0);
    let base_cost = tariff.base_rub + additional_liters * tariff.per_liter_rub;
    let total_cost = base_cost * tariff.coefficient;

    if !total_cost.is_finite() {
        warn!("Logistics cost for {} L overflowed, returning zero", volume_liters);
        return zero_cost(tariff);
    }

    debug!(
        "Logistics cost for {} L: base {} x coefficient {} = {}",
        volume_liters, base_cost, tariff.coefficient, total_cost
    );

    LogisticsCostResult {
        total_cost,
        base_cost,
        volume_liters,
        additional_liters,
        tariff,
    }
}

fn zero_cost(tariff: LogisticsTariff) -> LogisticsCostResult {
    LogisticsCostResult {
        total_cost: 0.0,
        base_cost: 0.0,
        volume_liters: 0.0,
        additional_liters: 0.0,
        tariff,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakdownLine {
    Volume { liters: f64 },
    BaseRate { rub: f64 },
    AdditionalLiters { liters: f64, per_liter_rub: f64, cost: f64 },
    Coefficient { value: f64 },
    Total { rub: f64 },
}

impl fmt::Display for BreakdownLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownLine::Volume { liters } if *liters > 0.0 && *liters < 0.001 => {
                write!(f, "Volume: {:.6} L", liters)
            }
            BreakdownLine::Volume { liters } => write!(f, "Volume: {:.3} L", liters),
            BreakdownLine::BaseRate { rub } => {
                write!(f, "Base rate (first liter): {:.2} {}", rub, CURRENCY_SYMBOL)
            }
            BreakdownLine::AdditionalLiters {
                liters,
                per_liter_rub,
                cost,
            } => write!(
                f,
                "Additional liters: {:.3} L × {:.2} {} = {:.2} {}",
                liters, per_liter_rub, CURRENCY_SYMBOL, cost, CURRENCY_SYMBOL
            ),
            BreakdownLine::Coefficient { value } => {
                write!(f, "Warehouse coefficient: ×{:.2}", value)
            }
            BreakdownLine::Total { rub } => {
                write!(f, "{}{:.2} {}", TOTAL_PREFIX, rub, CURRENCY_SYMBOL)
            }
        }
    }
}

/// Ordered line items explaining `result`. Terms with no effect on the total
/// (no additional liters, unit coefficient) get no line.
pub fn breakdown_lines(result: &LogisticsCostResult) -> Vec<BreakdownLine> {
    let mut lines = vec![BreakdownLine::Volume {
        liters: result.volume_liters,
    }];

    if result.volume_liters > 0.0 {
        lines.push(BreakdownLine::BaseRate {
            rub: result.tariff.base_rub,
        });

        if result.additional_liters > 0.0 {
            lines.push(BreakdownLine::AdditionalLiters {
                liters: result.additional_liters,
                per_liter_rub: result.tariff.per_liter_rub,
                cost: result.additional_liters * result.tariff.per_liter_rub,
            });
        }

        if result.tariff.coefficient != 1.0 {
            lines.push(BreakdownLine::Coefficient {
                value: result.tariff.coefficient,
            });
        }
    }

    lines.push(BreakdownLine::Total {
        rub: round_currency(result.total_cost),
    });

    lines
}

pub fn format_breakdown(result: &LogisticsCostResult) -> Vec<String> {
    breakdown_lines(result)
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Reads the total back out of lines produced by [`format_breakdown`].
pub fn parse_breakdown_total(lines: &[String]) -> Option<f64> {
    lines
        .iter()
        .rev()
        .find_map(|line| line.strip_prefix(TOTAL_PREFIX))
        .and_then(|rest| rest.trim_end_matches(CURRENCY_SYMBOL).trim().parse().ok())
}
