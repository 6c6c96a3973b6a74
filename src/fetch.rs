use crate::aggregation::aggregate;
use crate::error::Result;
use crate::metrics::change_from;
use crate::periods::{weeks_in_month, PeriodId};
use crate::schema::{AggregatedFinancialRecord, ChangeResult, MetricKey, PeriodFinancialRecord};
use futures::future::{join_all, BoxFuture};
use log::{debug, info};

/// Where period records come from: an HTTP client, a cache, a fixture.
///
/// `Ok(None)` means the source has no data for the period.
pub trait PeriodSource: Sync {
    fn fetch_period<'a>(
        &'a self,
        period: &'a PeriodId,
    ) -> BoxFuture<'a, Result<Option<PeriodFinancialRecord>>>;
}

/// Fetches all `periods` concurrently and aggregates what came back.
///
/// Periods without data are skipped. The first fetch error is returned.
pub async fn fetch_aggregated<S: PeriodSource + ?Sized>(
    source: &S,
    periods: &[PeriodId],
) -> Result<Option<AggregatedFinancialRecord>> {
    let records = fetch_all(source, periods).await?;
    Ok(aggregate(&records))
}

/// Aggregates every ISO week that belongs to the month.
pub async fn fetch_month<S: PeriodSource + ?Sized>(
    source: &S,
    year: i32,
    month: u32,
) -> Result<Option<AggregatedFinancialRecord>> {
    let weeks = weeks_in_month(year, month)?;
    info!(
        "Fetching {} weeks for {:04}-{:02}",
        weeks.len(),
        year,
        month
    );
    fetch_aggregated(source, &weeks).await
}

/// Fetches `period` and the one before it side by side.
pub async fn fetch_comparison<S: PeriodSource + ?Sized>(
    source: &S,
    period: PeriodId,
) -> Result<PeriodComparison> {
    let previous = period.previous()?;

    let (current, prior) = futures::join!(
        source.fetch_period(&period),
        source.fetch_period(&previous)
    );

    Ok(PeriodComparison {
        current: current?.and_then(|r| aggregate(&[r])),
        previous: prior?.and_then(|r| aggregate(&[r])),
    })
}

async fn fetch_all<S: PeriodSource + ?Sized>(
    source: &S,
    periods: &[PeriodId],
) -> Result<Vec<PeriodFinancialRecord>> {
    let results = join_all(periods.iter().map(|p| source.fetch_period(p))).await;

    let mut records = Vec::with_capacity(results.len());
    for (period, result) in periods.iter().zip(results) {
        match result? {
            Some(record) => records.push(record),
            None => debug!("No data for period {}", period),
        }
    }

    Ok(records)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodComparison {
    pub current: Option<AggregatedFinancialRecord>,
    pub previous: Option<AggregatedFinancialRecord>,
}

impl PeriodComparison {
    pub fn change(&self, key: MetricKey) -> ChangeResult {
        change_from(
            self.current.as_ref().and_then(|r| r.metric(key)),
            self.previous.as_ref().and_then(|r| r.metric(key)),
        )
    }

    pub fn margin_change(&self) -> ChangeResult {
        change_from(
            self.current.as_ref().and_then(|r| r.margin_pct),
            self.previous.as_ref().and_then(|r| r.margin_pct),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SellerFinanceError;
    use crate::schema::Trend;
    use futures::executor::block_on;
    use futures::FutureExt;
    use std::collections::HashMap;

    struct FixtureSource {
        records: HashMap<String, PeriodFinancialRecord>,
        failing: Option<String>,
    }

    impl FixtureSource {
        fn new(records: Vec<PeriodFinancialRecord>) -> Self {
            Self {
                records: records
                    .into_iter()
                    .map(|r| (r.period.clone(), r))
                    .collect(),
                failing: None,
            }
        }
    }

    impl PeriodSource for FixtureSource {
        fn fetch_period<'a>(
            &'a self,
            period: &'a PeriodId,
        ) -> BoxFuture<'a, Result<Option<PeriodFinancialRecord>>> {
            async move {
                let label = period.to_string();
                if self.failing.as_deref() == Some(label.as_str()) {
                    return Err(SellerFinanceError::FetchError {
                        period: label,
                        details: "HTTP 503".to_string(),
                    });
                }
                Ok(self.records.get(&label).cloned())
            }
            .boxed()
        }
    }

    fn week(label: &str, revenue: f64) -> PeriodFinancialRecord {
        PeriodFinancialRecord::new(label)
            .with_metric(MetricKey::SaleGross, revenue)
            .with_metric(MetricKey::Cogs, revenue / 2.0)
            .with_products(5, 5)
    }

    #[test]
    fn test_fetch_aggregated_skips_missing_periods() {
        let source = FixtureSource::new(vec![week("2024-W05", 100.0), week("2024-W06", 200.0)]);
        let periods: Vec<PeriodId> = ["2024-W05", "2024-W06", "2024-W07"]
            .iter()
            .map(|p| p.parse().unwrap())
            .collect();

        let result = block_on(fetch_aggregated(&source, &periods)).unwrap().unwrap();
        assert_eq!(result.period_count, 2);
        assert_eq!(result.revenue(), Some(300.0));
    }

    #[test]
    fn test_fetch_aggregated_nothing_found() {
        let source = FixtureSource::new(vec![]);
        let periods: Vec<PeriodId> = vec!["2024-W05".parse().unwrap()];
        assert!(block_on(fetch_aggregated(&source, &periods)).unwrap().is_none());
    }

    #[test]
    fn test_fetch_error_propagates() {
        let mut source = FixtureSource::new(vec![week("2024-W05", 100.0)]);
        source.failing = Some("2024-W06".to_string());
        let periods: Vec<PeriodId> = vec!["2024-W05".parse().unwrap(), "2024-W06".parse().unwrap()];

        let err = block_on(fetch_aggregated(&source, &periods)).unwrap_err();
        assert!(matches!(err, SellerFinanceError::FetchError { .. }));
    }

    #[test]
    fn test_fetch_month_uses_weeks_of_month() {
        let source = FixtureSource::new(vec![
            week("2024-W04", 1000.0),
            week("2024-W05", 100.0),
            week("2024-W06", 100.0),
            week("2024-W07", 100.0),
            week("2024-W08", 100.0),
            week("2024-W09", 100.0),
            week("2024-W10", 1000.0),
        ]);

        let result = block_on(fetch_month(&source, 2024, 2)).unwrap().unwrap();
        assert_eq!(result.period_count, 5);
        assert_eq!(result.revenue(), Some(500.0));
        assert_eq!(result.margin_pct, Some(50.0));
    }

    #[test]
    fn test_fetch_comparison() {
        let source = FixtureSource::new(vec![week("2024-W05", 50.0), week("2024-W06", 100.0)]);

        let comparison = block_on(fetch_comparison(&source, "2024-W06".parse().unwrap())).unwrap();
        let change = comparison.change(MetricKey::SaleGross);
        assert_eq!(change.value, Some(50.0));
        assert_eq!(change.percentage, Some(100.0));
        assert_eq!(change.trend, Trend::Up);

        let margin = comparison.margin_change();
        assert_eq!(margin.value, Some(0.0));
        assert_eq!(margin.trend, Trend::Same);
    }

    #[test]
    fn test_comparison_without_previous_period() {
        let source = FixtureSource::new(vec![week("2024-W06", 100.0)]);

        let comparison = block_on(fetch_comparison(&source, "2024-W06".parse().unwrap())).unwrap();
        assert!(comparison.previous.is_none());
        assert_eq!(comparison.change(MetricKey::SaleGross), ChangeResult::incomparable());
    }
}
