//! Validation utilities

use bigdecimal::BigDecimal;

use crate::engine::{ComputeError, ComputeResult};

/// Validate that a required text field is present and non-blank
pub fn validate_required(field: &'static str, value: &str) -> ComputeResult<()> {
    if value.trim().is_empty() {
        return Err(ComputeError::MissingField(field));
    }
    Ok(())
}

/// Validate that a line quantity is a positive integer
pub fn validate_quantity(product: &str, quantity: u32) -> ComputeResult<()> {
    if quantity == 0 {
        return Err(ComputeError::InvalidQuantity {
            product: product.to_string(),
            quantity,
        });
    }
    Ok(())
}

/// Validate that a discount percentage lies within [0, 100]
pub fn validate_discount_percent(product: &str, percent: &BigDecimal) -> ComputeResult<()> {
    if *percent < BigDecimal::from(0) || *percent > BigDecimal::from(100) {
        return Err(ComputeError::DiscountOutOfRange {
            product: product.to_string(),
            percent: percent.clone(),
        });
    }
    Ok(())
}

/// Validate that a tax rate is a fraction within [0, 1]
pub fn validate_tax_rate(rate: &BigDecimal) -> ComputeResult<()> {
    if *rate < BigDecimal::from(0) || *rate > BigDecimal::from(1) {
        return Err(ComputeError::InvalidTaxRate(rate.clone()));
    }
    Ok(())
}
