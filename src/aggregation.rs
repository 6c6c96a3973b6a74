use crate::metrics::gross_margin;
use crate::resolver::resolve;
use crate::schema::{AggregatedFinancialRecord, MetricKey, PeriodFinancialRecord};
use log::{debug, info, warn};
use std::collections::BTreeMap;

pub struct PeriodAggregator;

impl PeriodAggregator {
    /// Combines per-period records into one.
    ///
    /// Returns `None` for an empty slice. A single record goes through the
    /// same path as many, so its margin is always re-derived from the
    /// canonical formula.
    pub fn aggregate(records: &[PeriodFinancialRecord]) -> Option<AggregatedFinancialRecord> {
        if records.is_empty() {
            debug!("No period records to aggregate");
            return None;
        }

        info!("Aggregating {} period record(s)", records.len());

        // 1. Sum every metric that at least one period defines
        let metrics = sum_metrics(records);

        // 2. Product counts recur every period, so take the maximum
        let products_total = records.iter().filter_map(|r| r.products_total).max();
        let products_with_cogs = records
            .iter()
            .filter_map(|r| r.products_with_cogs)
            .max()
            .map(|with_cogs| match products_total {
                Some(total) => with_cogs.min(total),
                None => with_cogs,
            });

        let cogs_coverage_pct = coverage_pct(products_with_cogs, products_total);

        // 3. Profit and margin only with complete COGS coverage
        let revenue = metrics.get(&MetricKey::SaleGross).copied();
        let cogs = metrics.get(&MetricKey::Cogs).copied();

        let profit = match (cogs_coverage_pct, revenue, cogs) {
            (Some(pct), Some(revenue), Some(cogs)) if pct == 100.0 => gross_margin(revenue, cogs),
            _ => None,
        };

        debug!(
            "COGS coverage {:?} ({:?}/{:?}), revenue {:?}, margin {}",
            cogs_coverage_pct,
            products_with_cogs,
            products_total,
            revenue,
            if profit.is_some() { "computed" } else { "omitted" }
        );

        if let [single] = records {
            if let (Some(reported), Some((_, canonical))) = (single.margin_pct, profit) {
                if (reported - canonical).abs() > 1e-9 {
                    debug!(
                        "Period {} reported margin {} differs from canonical {}, using canonical",
                        single.period, reported, canonical
                    );
                }
            }
        }

        Some(AggregatedFinancialRecord {
            periods: records.iter().map(|r| r.period.clone()).collect(),
            period_count: records.len(),
            metrics,
            products_total,
            products_with_cogs,
            cogs_coverage_pct,
            gross_profit: profit.map(|(gross_profit, _)| gross_profit),
            margin_pct: profit.map(|(_, margin_pct)| margin_pct),
        })
    }
}

fn sum_metrics(records: &[PeriodFinancialRecord]) -> BTreeMap<MetricKey, f64> {
    let mut metrics = BTreeMap::new();

    for key in MetricKey::ALL {
        let mut defined = false;
        let mut sum = 0.0;

        for record in records {
            if let Some(value) = resolve(record, key) {
                defined = true;
                sum += value;
            }
        }

        if !defined {
            continue;
        }

        if !sum.is_finite() {
            warn!(
                "Dropping {} from aggregate: sum over {} periods is not finite",
                key.current_field(),
                records.len()
            );
            continue;
        }

        metrics.insert(key, sum);
    }

    metrics
}

fn coverage_pct(products_with_cogs: Option<u32>, products_total: Option<u32>) -> Option<f64> {
    let total = products_total.filter(|&t| t > 0)?;
    let with_cogs = products_with_cogs?;
    Some(f64::from(with_cogs) / f64::from(total) * 100.0)
}

pub fn aggregate(records: &[PeriodFinancialRecord]) -> Option<AggregatedFinancialRecord> {
    PeriodAggregator::aggregate(records)
}
