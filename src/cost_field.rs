use crate::error::Result;
use crate::logistics::{calculate, format_breakdown, volume_liters};
use crate::schema::{LogisticsCostResult, LogisticsTariff};
use crate::tariffs::TariffTable;
use log::debug;
use serde::{Deserialize, Serialize};

/// Displayed logistics cost in the price calculator.
///
/// `Auto` mirrors the live calculation. `Manual` holds what the user typed
/// until they restore the calculated value or switch auto back on. Both
/// states keep the latest calculated value so it can be restored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CostField {
    Auto { calculated: f64 },
    Manual { value: f64, calculated: f64 },
}

impl Default for CostField {
    fn default() -> Self {
        Self::Auto { calculated: 0.0 }
    }
}

impl CostField {
    pub fn value(&self) -> f64 {
        match *self {
            CostField::Auto { calculated } => calculated,
            CostField::Manual { value, .. } => value,
        }
    }

    pub fn calculated(&self) -> f64 {
        match *self {
            CostField::Auto { calculated } | CostField::Manual { calculated, .. } => calculated,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, CostField::Manual { .. })
    }

    /// Whether a "restore calculated value" action would change anything.
    pub fn can_restore(&self) -> bool {
        match *self {
            CostField::Auto { .. } => false,
            CostField::Manual { value, calculated } => value != calculated,
        }
    }

    /// Feeds a fresh calculation. Only `Auto` shows it.
    pub fn recalculated(&mut self, total: f64) {
        match self {
            CostField::Auto { calculated } | CostField::Manual { calculated, .. } => {
                *calculated = total
            }
        }
    }

    /// Direct edit of the cost input.
    pub fn edit(&mut self, value: f64) {
        *self = CostField::Manual {
            value,
            calculated: self.calculated(),
        };
    }

    pub fn restore_calculated(&mut self) {
        *self = CostField::Auto {
            calculated: self.calculated(),
        };
    }

    /// The auto-calculate switch. Turning it on overwrites the field with the
    /// calculated value; turning it off keeps the displayed value as manual.
    pub fn set_auto(&mut self, enabled: bool) {
        match (enabled, *self) {
            (true, _) => self.restore_calculated(),
            (false, CostField::Auto { calculated }) => {
                *self = CostField::Manual {
                    value: calculated,
                    calculated,
                }
            }
            (false, CostField::Manual { .. }) => {}
        }
    }
}

/// Price calculator inputs that drive the logistics estimate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCalculatorForm {
    length_cm: f64,
    width_cm: f64,
    height_cm: f64,
    tariff: Option<LogisticsTariff>,
    calculation: Option<LogisticsCostResult>,
    logistics: CostField,
}

impl PriceCalculatorForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dimensions(&mut self, length_cm: f64, width_cm: f64, height_cm: f64) {
        self.length_cm = length_cm;
        self.width_cm = width_cm;
        self.height_cm = height_cm;
        self.recompute();
    }

    pub fn select_tariff(&mut self, tariff: Option<LogisticsTariff>) {
        self.tariff = tariff;
        self.recompute();
    }

    pub fn select_warehouse(&mut self, table: &TariffTable, warehouse_name: &str) -> Result<()> {
        let tariff = table.tariff_for(warehouse_name)?;
        debug!("Selected warehouse {} with tariff {:?}", warehouse_name, tariff);
        self.select_tariff(Some(tariff));
        Ok(())
    }

    pub fn volume_liters(&self) -> f64 {
        volume_liters(self.length_cm, self.width_cm, self.height_cm)
    }

    pub fn calculation(&self) -> Option<&LogisticsCostResult> {
        self.calculation.as_ref()
    }

    pub fn logistics(&self) -> &CostField {
        &self.logistics
    }

    pub fn logistics_cost(&self) -> f64 {
        self.logistics.value()
    }

    pub fn edit_logistics_cost(&mut self, value: f64) {
        self.logistics.edit(value);
    }

    pub fn restore_logistics_cost(&mut self) {
        self.logistics.restore_calculated();
    }

    pub fn set_auto_logistics(&mut self, enabled: bool) {
        self.logistics.set_auto(enabled);
    }

    pub fn breakdown(&self) -> Vec<String> {
        self.calculation
            .as_ref()
            .map(format_breakdown)
            .unwrap_or_default()
    }

    fn recompute(&mut self) {
        self.calculation = self
            .tariff
            .map(|tariff| calculate(self.volume_liters(), tariff));

        let total = self.calculation.map(|c| c.total_cost).unwrap_or(0.0);
        self.logistics.recalculated(total);
    }
}
