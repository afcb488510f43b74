//! GST (Goods and Services Tax) split math for intra-state invoices

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// GST computed on a taxable value and split evenly between the central
/// and state components, as required for intra-state supplies
///
/// All amounts are exact: `total` is the taxable value times the rate
/// with no rounding, and `cgst`/`sgst` are each exactly half of `total`,
/// even when that half carries sub-cent digits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstBreakdown {
    /// Tax rate as a fraction of the taxable value (0.18 for 18%)
    pub rate: BigDecimal,
    /// Amount the tax was computed from
    pub taxable_value: BigDecimal,
    /// Total GST amount (taxable value x rate)
    pub total: BigDecimal,
    /// Central GST half
    pub cgst: BigDecimal,
    /// State GST half
    pub sgst: BigDecimal,
}

impl GstBreakdown {
    /// Compute GST on `taxable_value` at `rate`
    pub fn calculate(taxable_value: BigDecimal, rate: &BigDecimal) -> Self {
        let total = &taxable_value * rate;
        let half = &total / BigDecimal::from(2);
        Self {
            rate: rate.clone(),
            taxable_value,
            total,
            cgst: half.clone(),
            sgst: half,
        }
    }

    /// Percentage carried by one half, for labels like "CGST (9%)"
    pub fn half_rate_percent(&self) -> BigDecimal {
        ((&self.rate * BigDecimal::from(100)) / BigDecimal::from(2)).normalized()
    }
}
