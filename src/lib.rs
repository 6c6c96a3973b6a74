//! # Seller Finance Engine
//!
//! Calculation core for a marketplace seller analytics dashboard: combines
//! per-period finance reports into one record, derives margin and
//! period-over-period changes, and prices warehouse logistics by volume.
//!
//! ## Core Concepts
//!
//! - **Field resolution**: every metric may arrive under a current `*_total`
//!   key and a legacy key; exactly one is used, never their sum
//! - **Aggregation**: money is summed across periods, product counts take the
//!   maximum, and profit/margin exist only at 100% COGS coverage
//! - **Absent is not zero**: anything that cannot be computed is `None`, so the
//!   UI shows a placeholder instead of a fabricated `0`
//! - **Logistics tariff**: first liter at a flat base rate, each further liter
//!   at a marginal rate, scaled by the warehouse coefficient
//!
//! ## Example
//!
//! ```rust
//! use seller_finance_engine::*;
//!
//! let weeks = vec![
//!     PeriodFinancialRecord::new("2024-W05")
//!         .with_metric(MetricKey::SaleGross, 1000.0)
//!         .with_metric(MetricKey::Cogs, 400.0)
//!         .with_products(10, 10),
//!     PeriodFinancialRecord::new("2024-W06")
//!         .with_legacy_metric(MetricKey::SaleGross, 1000.0)
//!         .with_metric(MetricKey::Cogs, 600.0)
//!         .with_products(10, 10),
//! ];
//!
//! let month = aggregate(&weeks).unwrap();
//! assert_eq!(month.margin_pct, Some(50.0));
//!
//! let tariff = LogisticsTariff { base_rub: 46.0, per_liter_rub: 14.0, coefficient: 1.5 };
//! assert_eq!(calculate(3.0, tariff).total_cost, 111.0);
//! ```

pub mod aggregation;
pub mod cost_field;
pub mod error;
pub mod expenses;
pub mod fetch;
pub mod logistics;
pub mod metrics;
pub mod periods;
pub mod pnl;
pub mod resolver;
pub mod schema;
pub mod tariffs;

pub use aggregation::{aggregate, PeriodAggregator};
pub use cost_field::{CostField, PriceCalculatorForm};
pub use error::{Result, SellerFinanceError};
pub use expenses::{expense_breakdown, ExpenseBreakdown, ExpenseItem};
pub use fetch::{fetch_aggregated, fetch_comparison, fetch_month, PeriodComparison, PeriodSource};
pub use logistics::{
    breakdown_lines, calculate, format_breakdown, parse_breakdown_total, round_currency,
    volume_liters, BreakdownLine, CURRENCY_DECIMALS,
};
pub use metrics::{change_from, gross_margin, percent_of_base};
pub use periods::{parse_period_range, weeks_in_month, PeriodId};
pub use pnl::{pnl_waterfall, StepKind, WaterfallStep};
pub use resolver::resolve;
pub use schema::*;
pub use tariffs::{TariffTable, WarehouseTariff};

use log::{debug, info};
use serde::Serialize;

/// Everything a finance dashboard renders for one selection of periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub record: AggregatedFinancialRecord,
    pub expenses: ExpenseBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waterfall: Option<Vec<WaterfallStep>>,
}

impl FinancialSummary {
    pub fn expense_share(&self, metric: MetricKey) -> Option<f64> {
        self.expenses.item(metric).and_then(|i| i.share_of_revenue)
    }
}

pub struct FinancialSummaryProcessor;

impl FinancialSummaryProcessor {
    pub fn process(records: &[PeriodFinancialRecord]) -> Option<FinancialSummary> {
        let record = aggregate(records)?;

        info!(
            "Building financial summary for {} period(s): {}",
            record.period_count,
            record.periods.join(", ")
        );

        let expenses = expense_breakdown(&record);
        let waterfall = pnl_waterfall(&record);

        debug!(
            "Summary has {} expense lines, margin {:?}, waterfall {}",
            expenses.items.len(),
            record.margin_pct,
            if waterfall.is_some() { "built" } else { "skipped" }
        );

        Some(FinancialSummary {
            record,
            expenses,
            waterfall,
        })
    }
}

pub fn summarize(records: &[PeriodFinancialRecord]) -> Option<FinancialSummary> {
    FinancialSummaryProcessor::process(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_summary() {
        let records = vec![
            PeriodFinancialRecord::new("2024-W05")
                .with_metric(MetricKey::SaleGross, 6_000.0)
                .with_metric(MetricKey::Commission, 900.0)
                .with_legacy_metric(MetricKey::Logistics, 300.0)
                .with_metric(MetricKey::Cogs, 2_500.0)
                .with_products(12, 12),
            PeriodFinancialRecord::new("2024-W06")
                .with_legacy_metric(MetricKey::SaleGross, 4_000.0)
                .with_metric(MetricKey::Commission, 600.0)
                .with_metric(MetricKey::Logistics, 200.0)
                .with_metric(MetricKey::Cogs, 1_500.0)
                .with_products(12, 11),
        ];

        let summary = summarize(&records).unwrap();
        assert_eq!(summary.record.revenue(), Some(10_000.0));
        assert_eq!(summary.record.products_with_cogs, Some(12));
        assert_eq!(summary.record.gross_profit, Some(6_000.0));
        assert_eq!(summary.record.margin_pct, Some(60.0));
        assert_eq!(summary.expense_share(MetricKey::Commission), Some(15.0));
        assert_eq!(summary.expense_share(MetricKey::Logistics), Some(5.0));

        let waterfall = summary.waterfall.unwrap();
        let result = waterfall.last().unwrap();
        assert_eq!(result.kind, StepKind::Total);
        assert!((result.running_total - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_of_nothing() {
        assert!(summarize(&[]).is_none());
    }
}
