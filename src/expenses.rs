use crate::metrics::percent_of_base;
use crate::schema::{AggregatedFinancialRecord, MetricKey};
use serde::{Deserialize, Serialize};

/// Marketplace expense categories, in display order.
pub const EXPENSE_METRICS: [MetricKey; 8] = [
    MetricKey::Commission,
    MetricKey::Logistics,
    MetricKey::Storage,
    MetricKey::Penalties,
    MetricKey::Acceptance,
    MetricKey::Deductions,
    MetricKey::Advertising,
    MetricKey::LoyaltyFee,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub metric: MetricKey,
    pub label: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_of_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub items: Vec<ExpenseItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_share_of_revenue: Option<f64>,
}

impl ExpenseBreakdown {
    pub fn item(&self, metric: MetricKey) -> Option<&ExpenseItem> {
        self.items.iter().find(|i| i.metric == metric)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Expense lines of `record` with their share of revenue.
///
/// Only reported categories appear; a reported zero is kept.
pub fn expense_breakdown(record: &AggregatedFinancialRecord) -> ExpenseBreakdown {
    let revenue = record.revenue();

    let items: Vec<ExpenseItem> = EXPENSE_METRICS
        .iter()
        .filter_map(|&metric| {
            record.metric(metric).map(|amount| ExpenseItem {
                metric,
                label: metric.label().to_string(),
                amount,
                share_of_revenue: percent_of_base(Some(amount), revenue),
            })
        })
        .collect();

    let total = if items.is_empty() {
        None
    } else {
        Some(items.iter().map(|i| i.amount).sum::<f64>())
    };

    ExpenseBreakdown {
        total_share_of_revenue: percent_of_base(total, revenue),
        items,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use crate::schema::PeriodFinancialRecord;

    #[test]
    fn test_breakdown_with_shares() {
        let record = aggregate(&[PeriodFinancialRecord::new("2024-03")
            .with_metric(MetricKey::SaleGross, 1000.0)
            .with_metric(MetricKey::Commission, 150.0)
            .with_legacy_metric(MetricKey::Logistics, 100.0)
            .with_metric(MetricKey::Penalties, 0.0)])
        .unwrap();

        let breakdown = expense_breakdown(&record);
        assert_eq!(breakdown.items.len(), 3);
        assert_eq!(breakdown.items[0].metric, MetricKey::Commission);
        assert_eq!(breakdown.items[0].share_of_revenue, Some(15.0));
        assert_eq!(breakdown.item(MetricKey::Logistics).unwrap().amount, 100.0);
        assert_eq!(breakdown.item(MetricKey::Penalties).unwrap().amount, 0.0);
        assert!(breakdown.item(MetricKey::Storage).is_none());
        assert_eq!(breakdown.total, Some(250.0));
        assert_eq!(breakdown.total_share_of_revenue, Some(25.0));
    }

    #[test]
    fn test_breakdown_without_revenue() {
        let record = aggregate(&[
            PeriodFinancialRecord::new("2024-03").with_metric(MetricKey::Storage, 40.0)
        ])
        .unwrap();

        let breakdown = expense_breakdown(&record);
        assert_eq!(breakdown.total, Some(40.0));
        assert_eq!(breakdown.items[0].share_of_revenue, None);
        assert_eq!(breakdown.total_share_of_revenue, None);
    }

    #[test]
    fn test_breakdown_empty() {
        let record = aggregate(&[PeriodFinancialRecord::new("2024-03")]).unwrap();
        let breakdown = expense_breakdown(&record);
        assert!(breakdown.is_empty());
        assert_eq!(breakdown.total, None);
    }
}
