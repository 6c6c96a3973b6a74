use crate::schema::{MetricKey, PeriodFinancialRecord};

/// Returns the authoritative value of `key` in `record`.
///
/// The current `*_total` field wins whenever it holds a number; the legacy
/// field is consulted only when it does not. The two are never added.
/// `Some(0.0)` is a value like any other. Non-finite numbers count as missing.
pub fn resolve(record: &PeriodFinancialRecord, key: MetricKey) -> Option<f64> {
    let (current, legacy) = source_values(record, key);
    current
        .filter(|v| v.is_finite())
        .or_else(|| legacy.filter(|v| v.is_finite()))
}

/// Raw `(current, legacy)` field values for `key`, unresolved.
pub fn source_values(record: &PeriodFinancialRecord, key: MetricKey) -> (Option<f64>, Option<f64>) {
    match key {
        MetricKey::SaleGross => (record.sale_gross_total, record.sale_gross),
        MetricKey::Returns => (record.returns_total, record.returns),
        MetricKey::Commission => (record.commission_total, record.commission),
        MetricKey::Logistics => (record.logistics_total, record.logistics_cost),
        MetricKey::Storage => (record.storage_total, record.storage_cost),
        MetricKey::Penalties => (record.penalties_total, record.penalties),
        MetricKey::Acceptance => (record.acceptance_total, None),
        MetricKey::Deductions => (record.deductions_total, record.deductions),
        MetricKey::Advertising => (record.advertising_total, None),
        MetricKey::LoyaltyFee => (record.loyalty_fee_total, record.loyalty_fee),
        MetricKey::LoyaltyCompensation => (
            record.loyalty_compensation_total,
            record.loyalty_compensation,
        ),
        MetricKey::Payout => (record.payout_total, record.payout),
        MetricKey::Cogs => (record.cogs_total, record.cogs),
    }
}

fn current_slot(record: &mut PeriodFinancialRecord, key: MetricKey) -> &mut Option<f64> {
    match key {
        MetricKey::SaleGross => &mut record.sale_gross_total,
        MetricKey::Returns => &mut record.returns_total,
        MetricKey::Commission => &mut record.commission_total,
        MetricKey::Logistics => &mut record.logistics_total,
        MetricKey::Storage => &mut record.storage_total,
        MetricKey::Penalties => &mut record.penalties_total,
        MetricKey::Acceptance => &mut record.acceptance_total,
        MetricKey::Deductions => &mut record.deductions_total,
        MetricKey::Advertising => &mut record.advertising_total,
        MetricKey::LoyaltyFee => &mut record.loyalty_fee_total,
        MetricKey::LoyaltyCompensation => &mut record.loyalty_compensation_total,
        MetricKey::Payout => &mut record.payout_total,
        MetricKey::Cogs => &mut record.cogs_total,
    }
}

fn legacy_slot(record: &mut PeriodFinancialRecord, key: MetricKey) -> Option<&mut Option<f64>> {
    match key {
        MetricKey::SaleGross => Some(&mut record.sale_gross),
        MetricKey::Returns => Some(&mut record.returns),
        MetricKey::Commission => Some(&mut record.commission),
        MetricKey::Logistics => Some(&mut record.logistics_cost),
        MetricKey::Storage => Some(&mut record.storage_cost),
        MetricKey::Penalties => Some(&mut record.penalties),
        MetricKey::Acceptance | MetricKey::Advertising => None,
        MetricKey::Deductions => Some(&mut record.deductions),
        MetricKey::LoyaltyFee => Some(&mut record.loyalty_fee),
        MetricKey::LoyaltyCompensation => Some(&mut record.loyalty_compensation),
        MetricKey::Payout => Some(&mut record.payout),
        MetricKey::Cogs => Some(&mut record.cogs),
    }
}

impl PeriodFinancialRecord {
    /// Sets the current `*_total` field of `key`.
    pub fn set_metric(&mut self, key: MetricKey, value: f64) {
        *current_slot(self, key) = Some(value);
    }

    /// Sets the legacy field of `key`. Returns `false` if the metric never had one.
    pub fn set_legacy_metric(&mut self, key: MetricKey, value: f64) -> bool {
        match legacy_slot(self, key) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn with_metric(mut self, key: MetricKey, value: f64) -> Self {
        self.set_metric(key, value);
        self
    }

    pub fn with_legacy_metric(mut self, key: MetricKey, value: f64) -> Self {
        self.set_legacy_metric(key, value);
        self
    }

    pub fn with_products(mut self, total: u32, with_cogs: u32) -> Self {
        self.products_total = Some(total);
        self.products_with_cogs = Some(with_cogs);
        self
    }

    pub fn resolve(&self, key: MetricKey) -> Option<f64> {
        resolve(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_field_wins_over_legacy() {
        let record = PeriodFinancialRecord::new("2024-W10")
            .with_legacy_metric(MetricKey::Commission, 500.0)
            .with_metric(MetricKey::Commission, 120.0);

        assert_eq!(resolve(&record, MetricKey::Commission), Some(120.0));
    }

    #[test]
    fn test_zero_current_value_is_not_missing() {
        let record = PeriodFinancialRecord::new("2024-W10")
            .with_legacy_metric(MetricKey::Penalties, 300.0)
            .with_metric(MetricKey::Penalties, 0.0);

        assert_eq!(resolve(&record, MetricKey::Penalties), Some(0.0));
    }

    #[test]
    fn test_falls_back_to_legacy_field() {
        let record =
            PeriodFinancialRecord::new("2024-W10").with_legacy_metric(MetricKey::Storage, 42.5);

        assert_eq!(resolve(&record, MetricKey::Storage), Some(42.5));
        assert_eq!(record.storage_cost, Some(42.5));
    }

    #[test]
    fn test_missing_everywhere_is_none() {
        let record = PeriodFinancialRecord::new("2024-W10");
        for key in MetricKey::ALL {
            assert_eq!(resolve(&record, key), None);
        }
    }

    #[test]
    fn test_non_finite_values_count_as_missing() {
        let mut record = PeriodFinancialRecord::new("2024-W10");
        record.returns_total = Some(f64::NAN);
        record.returns = Some(15.0);
        record.payout_total = Some(f64::INFINITY);

        assert_eq!(resolve(&record, MetricKey::Returns), Some(15.0));
        assert_eq!(resolve(&record, MetricKey::Payout), None);
    }

    #[test]
    fn test_metrics_without_legacy_field() {
        let mut record = PeriodFinancialRecord::new("2024-W10");
        assert!(!record.set_legacy_metric(MetricKey::Advertising, 10.0));
        assert!(record.set_legacy_metric(MetricKey::Cogs, 10.0));
        assert_eq!(record.cogs, Some(10.0));
        assert_eq!(resolve(&record, MetricKey::Advertising), None);
    }

    #[test]
    fn test_set_metric_matches_field_names() {
        for key in MetricKey::ALL {
            let record = PeriodFinancialRecord::new("2024-01").with_metric(key, 7.0);
            let json = serde_json::to_value(&record).unwrap();
            assert_eq!(json[key.current_field()], serde_json::json!(7.0));

            let legacy = PeriodFinancialRecord::new("2024-01").with_legacy_metric(key, 3.0);
            if let Some(field) = key.legacy_field() {
                let json = serde_json::to_value(&legacy).unwrap();
                assert_eq!(json[field], serde_json::json!(3.0));
            }
        }
    }
}
