use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Monetary metrics reported per period.
///
/// Each key maps to its current `*_total` field and, where the API used to
/// publish one, a legacy field. Serialized under the current field name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum MetricKey {
    #[serde(rename = "sale_gross_total")]
    SaleGross,
    #[serde(rename = "returns_total")]
    Returns,
    #[serde(rename = "commission_total")]
    Commission,
    #[serde(rename = "logistics_total")]
    Logistics,
    #[serde(rename = "storage_total")]
    Storage,
    #[serde(rename = "penalties_total")]
    Penalties,
    #[serde(rename = "acceptance_total")]
    Acceptance,
    #[serde(rename = "deductions_total")]
    Deductions,
    #[serde(rename = "advertising_total")]
    Advertising,
    #[serde(rename = "loyalty_fee_total")]
    LoyaltyFee,
    #[serde(rename = "loyalty_compensation_total")]
    LoyaltyCompensation,
    #[serde(rename = "payout_total")]
    Payout,
    #[serde(rename = "cogs_total")]
    Cogs,
}

impl MetricKey {
    pub const ALL: [MetricKey; 13] = [
        MetricKey::SaleGross,
        MetricKey::Returns,
        MetricKey::Commission,
        MetricKey::Logistics,
        MetricKey::Storage,
        MetricKey::Penalties,
        MetricKey::Acceptance,
        MetricKey::Deductions,
        MetricKey::Advertising,
        MetricKey::LoyaltyFee,
        MetricKey::LoyaltyCompensation,
        MetricKey::Payout,
        MetricKey::Cogs,
    ];

    pub fn current_field(&self) -> &'static str {
        match self {
            MetricKey::SaleGross => "sale_gross_total",
            MetricKey::Returns => "returns_total",
            MetricKey::Commission => "commission_total",
            MetricKey::Logistics => "logistics_total",
            MetricKey::Storage => "storage_total",
            MetricKey::Penalties => "penalties_total",
            MetricKey::Acceptance => "acceptance_total",
            MetricKey::Deductions => "deductions_total",
            MetricKey::Advertising => "advertising_total",
            MetricKey::LoyaltyFee => "loyalty_fee_total",
            MetricKey::LoyaltyCompensation => "loyalty_compensation_total",
            MetricKey::Payout => "payout_total",
            MetricKey::Cogs => "cogs_total",
        }
    }

    pub fn legacy_field(&self) -> Option<&'static str> {
        match self {
            MetricKey::SaleGross => Some("sale_gross"),
            MetricKey::Returns => Some("returns"),
            MetricKey::Commission => Some("commission"),
            MetricKey::Logistics => Some("logistics_cost"),
            MetricKey::Storage => Some("storage_cost"),
            MetricKey::Penalties => Some("penalties"),
            MetricKey::Acceptance => None,
            MetricKey::Deductions => Some("deductions"),
            MetricKey::Advertising => None,
            MetricKey::LoyaltyFee => Some("loyalty_fee"),
            MetricKey::LoyaltyCompensation => Some("loyalty_compensation"),
            MetricKey::Payout => Some("payout"),
            MetricKey::Cogs => Some("cogs"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::SaleGross => "Revenue",
            MetricKey::Returns => "Returns",
            MetricKey::Commission => "Commission",
            MetricKey::Logistics => "Logistics",
            MetricKey::Storage => "Storage",
            MetricKey::Penalties => "Penalties",
            MetricKey::Acceptance => "Acceptance",
            MetricKey::Deductions => "Deductions",
            MetricKey::Advertising => "Advertising",
            MetricKey::LoyaltyFee => "Loyalty fee",
            MetricKey::LoyaltyCompensation => "Loyalty compensation",
            MetricKey::Payout => "Payout",
            MetricKey::Cogs => "COGS",
        }
    }
}

/// One reporting period (ISO week or month) as delivered by the finance API.
///
/// Every monetary metric may arrive under its current `*_total` key, its
/// legacy key, or both. Read them through [`crate::resolver::resolve`], never
/// directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodFinancialRecord {
    #[schemars(description = "Period label, 'YYYY-Www' for ISO weeks or 'YYYY-MM' for months")]
    pub period: String,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Gross sales (revenue base). Authoritative over 'sale_gross'.")]
    pub sale_gross_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Legacy gross sales field, used only when 'sale_gross_total' is missing")]
    pub sale_gross: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub returns_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub returns: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub commission_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub commission: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub logistics_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub logistics_cost: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_cost: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub penalties_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub penalties: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Paid acceptance at the warehouse. No legacy counterpart.")]
    pub acceptance_total: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub deductions_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub deductions: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Advertising spend. No legacy counterpart.")]
    pub advertising_total: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub loyalty_fee_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub loyalty_fee: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub loyalty_compensation_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub loyalty_compensation: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub payout_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub payout: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Cost of goods sold for the period. Authoritative over 'cogs'.")]
    pub cogs_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub cogs: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Number of distinct products sold in the period")]
    pub products_total: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Number of those products that have a COGS value assigned")]
    pub products_with_cogs: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Precomputed by the producer. Ignored by aggregation, which re-derives it.")]
    pub gross_profit: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(description = "Precomputed by the producer. Ignored by aggregation, which re-derives it.")]
    pub margin_pct: Option<f64>,
}

impl PeriodFinancialRecord {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            ..Default::default()
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PeriodFinancialRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Reads a metric that may hold anything. Only a JSON number is a value;
/// strings, booleans, objects and `null` are absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|n| n.is_finite()))
}

/// Product counts: whole numbers, including `10.0`. Negative, fractional and
/// non-numeric counts are absent.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32))
}

/// Sum of one or more periods.
///
/// Metrics absent from every source period are absent here too. `gross_profit`
/// and `margin_pct` exist only when COGS coverage is complete; callers render a
/// placeholder when they are missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedFinancialRecord {
    pub periods: Vec<String>,
    pub period_count: usize,
    #[serde(flatten)]
    pub metrics: BTreeMap<MetricKey, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_with_cogs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cogs_coverage_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_pct: Option<f64>,
}

impl AggregatedFinancialRecord {
    pub fn metric(&self, key: MetricKey) -> Option<f64> {
        self.metrics.get(&key).copied()
    }

    pub fn revenue(&self) -> Option<f64> {
        self.metric(MetricKey::SaleGross)
    }

    pub fn has_full_cogs_coverage(&self) -> bool {
        self.cogs_coverage_pct == Some(100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Same,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeResult {
    pub value: Option<f64>,
    pub percentage: Option<f64>,
    pub trend: Trend,
}

impl ChangeResult {
    pub fn incomparable() -> Self {
        Self {
            value: None,
            percentage: None,
            trend: Trend::Same,
        }
    }
}

/// Warehouse box tariff: first liter at `base_rub`, every further liter at
/// `per_liter_rub`, the sum scaled by `coefficient`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsTariff {
    pub base_rub: f64,
    pub per_liter_rub: f64,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsCostResult {
    pub total_cost: f64,
    pub base_cost: f64,
    pub volume_liters: f64,
    pub additional_liters: f64,
    pub tariff: LogisticsTariff,
}
