use crate::error::{Result, SellerFinanceError};
use crate::schema::LogisticsTariff;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One warehouse row of the box-delivery tariff lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseTariff {
    #[schemars(description = "Warehouse display name, e.g. 'Коледино'")]
    pub warehouse_name: String,

    #[schemars(description = "Price of the first liter in rubles")]
    pub base_liter_rub: f64,

    #[schemars(description = "Price of every additional liter in rubles")]
    pub additional_liter_rub: f64,

    #[schemars(description = "Warehouse multiplier applied to the whole cost (1.0 = no markup)")]
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
}

fn default_coefficient() -> f64 {
    1.0
}

impl WarehouseTariff {
    pub fn tariff(&self) -> LogisticsTariff {
        LogisticsTariff {
            base_rub: self.base_liter_rub,
            per_liter_rub: self.additional_liter_rub,
            coefficient: self.coefficient,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TariffTable {
    pub warehouses: Vec<WarehouseTariff>,
}

impl TariffTable {
    pub fn new(warehouses: Vec<WarehouseTariff>) -> Self {
        Self { warehouses }
    }

    /// Parses and validates a table such as
    /// `{"warehouses": [{"warehouseName": "...", "baseLiterRub": 46, ...}]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: TariffTable = serde_json::from_str(json)?;
        table.validate()?;
        debug!("Loaded tariff table with {} warehouses", table.warehouses.len());
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for row in &self.warehouses {
            let name = normalize_name(&row.warehouse_name);
            if name.is_empty() {
                return Err(SellerFinanceError::InvalidTariff {
                    warehouse: row.warehouse_name.clone(),
                    details: "warehouse name is empty".to_string(),
                });
            }

            for (field, value) in [
                ("baseLiterRub", row.base_liter_rub),
                ("additionalLiterRub", row.additional_liter_rub),
                ("coefficient", row.coefficient),
            ] {
                if !value.is_finite() || value < 0.0 {
                    warn!("Rejecting tariff for {}: {} = {}", row.warehouse_name, field, value);
                    return Err(SellerFinanceError::InvalidTariff {
                        warehouse: row.warehouse_name.clone(),
                        details: format!("{} must be a non-negative number, got {}", field, value),
                    });
                }
            }

            if !seen.insert(name) {
                return Err(SellerFinanceError::InvalidTariff {
                    warehouse: row.warehouse_name.clone(),
                    details: "duplicate warehouse".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Case- and whitespace-insensitive lookup.
    pub fn get(&self, warehouse_name: &str) -> Option<&WarehouseTariff> {
        let wanted = normalize_name(warehouse_name);
        self.warehouses
            .iter()
            .find(|row| normalize_name(&row.warehouse_name) == wanted)
    }

    pub fn tariff_for(&self, warehouse_name: &str) -> Result<LogisticsTariff> {
        self.get(warehouse_name)
            .map(WarehouseTariff::tariff)
            .ok_or_else(|| SellerFinanceError::UnknownWarehouse(warehouse_name.to_string()))
    }

    pub fn warehouse_names(&self) -> Vec<&str> {
        self.warehouses
            .iter()
            .map(|row| row.warehouse_name.as_str())
            .collect()
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(TariffTable);
        serde_json::to_string_pretty(&schema)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
