use crate::schema::{AggregatedFinancialRecord, MetricKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Start,
    Increase,
    Decrease,
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricKey>,
    pub kind: StepKind,
    /// Signed effect of this step; negative for deductions.
    pub amount: f64,
    pub running_total: f64,
}

const DEDUCTIONS: [MetricKey; 9] = [
    MetricKey::Returns,
    MetricKey::Commission,
    MetricKey::Logistics,
    MetricKey::Storage,
    MetricKey::Penalties,
    MetricKey::Acceptance,
    MetricKey::Deductions,
    MetricKey::Advertising,
    MetricKey::LoyaltyFee,
];

/// Revenue-to-result waterfall for a P&L chart.
///
/// `None` without revenue. Costs are reported as positive magnitudes and
/// enter as decreases. COGS is deducted only when gross profit is present.
pub fn pnl_waterfall(record: &AggregatedFinancialRecord) -> Option<Vec<WaterfallStep>> {
    let revenue = record.revenue()?;

    let mut steps = vec![WaterfallStep {
        label: MetricKey::SaleGross.label().to_string(),
        metric: Some(MetricKey::SaleGross),
        kind: StepKind::Start,
        amount: revenue,
        running_total: revenue,
    }];
    let mut running = revenue;

    let mut push = |metric: MetricKey, amount: f64, kind: StepKind| {
        running += amount;
        steps.push(WaterfallStep {
            label: metric.label().to_string(),
            metric: Some(metric),
            kind,
            amount,
            running_total: running,
        });
    };

    for metric in DEDUCTIONS {
        if let Some(cost) = record.metric(metric) {
            push(metric, -cost.abs(), StepKind::Decrease);
        }
    }

    if let Some(compensation) = record.metric(MetricKey::LoyaltyCompensation) {
        push(
            MetricKey::LoyaltyCompensation,
            compensation.abs(),
            StepKind::Increase,
        );
    }

    if record.gross_profit.is_some() {
        if let Some(cogs) = record.metric(MetricKey::Cogs) {
            push(MetricKey::Cogs, -cogs.abs(), StepKind::Decrease);
        }
    }

    steps.push(WaterfallStep {
        label: "Result".to_string(),
        metric: None,
        kind: StepKind::Total,
        amount: running,
        running_total: running,
    });

    Some(steps)
}
