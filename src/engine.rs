//! Invoice computation engine
//!
//! Turns a billing request and the reference catalog into a fully
//! computed [`Invoice`]. The engine is pure: it does no I/O and reads no
//! clock, the issue date travels inside the request. Any invalid line
//! fails the whole computation; no partial invoice is ever produced.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::BillingConfig;
use crate::tax::gst::GstBreakdown;
use crate::types::{Invoice, LineItem, LineSpec, RoundingPolicy};
use crate::utils::validation::{
    validate_discount_percent, validate_quantity, validate_required, validate_tax_rate,
};

/// Errors that can occur while computing an invoice
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("unknown product '{0}'")]
    UnknownProduct(String),
    #[error("an invoice needs at least one line")]
    EmptyLines,
    #[error("quantity for '{product}' must be positive, got {quantity}")]
    InvalidQuantity { product: String, quantity: u32 },
    #[error("discount for '{product}' must be within [0, 100], got {percent}")]
    DiscountOutOfRange { product: String, percent: BigDecimal },
    #[error("required field '{0}' is blank")]
    MissingField(&'static str),
    #[error("tax rate must be a fraction within [0, 1], got {0}")]
    InvalidTaxRate(BigDecimal),
}

/// Result type for invoice computation
pub type ComputeResult<T> = Result<T, ComputeError>;

/// Everything the engine needs to compute one invoice
///
/// The customer fields may come from an outlet, a registered party, or
/// free-form entry; the engine treats them uniformly and only requires
/// that none of them is blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub customer: String,
    pub gstin: String,
    pub contact: String,
    pub address: String,
    /// Issue date, injected by the caller
    pub issued_on: NaiveDate,
    pub lines: Vec<LineSpec>,
}

/// Invoice computation engine
///
/// One engine serves every deployment variant: the tax rate and the
/// grand-total rounding policy are explicit knobs rather than separate
/// code paths.
///
/// # Example
///
/// ```rust
/// use billing_core::{InvoiceEngine, RoundingPolicy};
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// let rate = BigDecimal::from_str("0.18").unwrap();
/// let engine = InvoiceEngine::new(rate, RoundingPolicy::CeilToInteger).unwrap();
/// assert_eq!(engine.rounding(), RoundingPolicy::CeilToInteger);
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceEngine {
    tax_rate: BigDecimal,
    rounding: RoundingPolicy,
}

impl InvoiceEngine {
    /// Create an engine with an explicit tax rate and rounding policy
    ///
    /// The rate is a fraction of the subtotal (0.18 for 18%) and is
    /// validated up front so a misconfigured engine cannot be built.
    pub fn new(tax_rate: BigDecimal, rounding: RoundingPolicy) -> ComputeResult<Self> {
        validate_tax_rate(&tax_rate)?;
        Ok(Self { tax_rate, rounding })
    }

    /// Create an engine from a deployment profile
    pub fn from_config(config: &BillingConfig) -> ComputeResult<Self> {
        Self::new(config.tax_rate.clone(), config.grand_total_rounding)
    }

    /// Tax rate this engine applies, as a fraction of the subtotal
    pub fn tax_rate(&self) -> &BigDecimal {
        &self.tax_rate
    }

    /// Grand-total rounding policy this engine applies
    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    /// Compute a full invoice from a request
    ///
    /// Line amounts stay at full precision: the discounted unit price is
    /// `unit_price x (1 - discount/100)`, the line total is that times
    /// the quantity, and the subtotal is the exact sum of line totals.
    /// Only the grand total is rounded, under this engine's policy.
    pub fn compute(&self, catalog: &Catalog, request: InvoiceRequest) -> ComputeResult<Invoice> {
        validate_required("customer", &request.customer)?;
        validate_required("gstin", &request.gstin)?;
        validate_required("contact", &request.contact)?;
        validate_required("address", &request.address)?;
        if request.lines.is_empty() {
            return Err(ComputeError::EmptyLines);
        }

        let mut lines = Vec::with_capacity(request.lines.len());
        for spec in &request.lines {
            lines.push(compute_line(catalog, spec)?);
        }

        let subtotal: BigDecimal = lines.iter().map(|line| &line.line_total).sum();
        let tax = GstBreakdown::calculate(subtotal.clone(), &self.tax_rate);
        let grand_total = self.rounding.apply(&subtotal + &tax.total);

        debug!(
            customer = %request.customer,
            lines = lines.len(),
            subtotal = %subtotal,
            tax = %tax.total,
            grand_total = %grand_total,
            "computed invoice"
        );

        Ok(Invoice {
            customer: request.customer,
            gstin: request.gstin,
            contact: request.contact,
            address: request.address,
            issued_on: request.issued_on,
            lines,
            subtotal,
            tax,
            grand_total,
            rounding: self.rounding,
        })
    }
}

fn compute_line(catalog: &Catalog, spec: &LineSpec) -> ComputeResult<LineItem> {
    validate_quantity(&spec.product, spec.quantity)?;
    validate_discount_percent(&spec.product, &spec.discount_percent)?;

    let product = catalog
        .find_product(&spec.product)
        .ok_or_else(|| ComputeError::UnknownProduct(spec.product.clone()))?;

    let factor = BigDecimal::from(1) - &spec.discount_percent / BigDecimal::from(100);
    let discounted_unit_price = &product.unit_price * &factor;
    let line_total = &discounted_unit_price * BigDecimal::from(spec.quantity);

    Ok(LineItem {
        product: product.name.clone(),
        quantity: spec.quantity,
        unit_price: product.unit_price.clone(),
        discount_percent: spec.discount_percent.clone(),
        discounted_unit_price,
        line_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompanyProfile;
    use crate::types::Product;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn product(name: &str, price: &str) -> Product {
        Product {
            name: name.to_string(),
            unit_price: dec(price),
            category_prices: HashMap::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_tables(
            vec![
                product("Lip Tint", "500.00"),
                product("Vitamin C Serum", "200.00"),
                product("Aloe Face Wash", "150.00"),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    fn engine(rounding: RoundingPolicy) -> InvoiceEngine {
        InvoiceEngine::new(dec("0.18"), rounding).unwrap()
    }

    fn request(lines: Vec<LineSpec>) -> InvoiceRequest {
        InvoiceRequest {
            customer: "Sunrise Mart".to_string(),
            gstin: "27ABCDE1234F1Z5".to_string(),
            contact: "9800000000".to_string(),
            address: "14 Market Road, Pune".to_string(),
            issued_on: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            lines,
        }
    }

    #[test]
    fn test_single_line_with_ceiling_policy() {
        let invoice = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(vec![LineSpec::new("Lip Tint", 3, dec("10"))]))
            .unwrap();

        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].discounted_unit_price, dec("450.00"));
        assert_eq!(invoice.lines[0].line_total, dec("1350.00"));
        assert_eq!(invoice.subtotal, dec("1350.00"));
        assert_eq!(invoice.tax.total, dec("243.00"));
        assert_eq!(invoice.tax.cgst, dec("121.50"));
        assert_eq!(invoice.tax.sgst, dec("121.50"));
        assert_eq!(invoice.grand_total, dec("1593"));
        assert!(invoice.grand_total.is_integer());
    }

    #[test]
    fn test_two_lines_with_two_decimal_policy() {
        let lines = vec![
            LineSpec::new("Vitamin C Serum", 2, dec("0")),
            LineSpec::new("Aloe Face Wash", 1, dec("20")),
        ];
        let invoice = engine(RoundingPolicy::RoundTwoDecimals)
            .compute(&catalog(), request(lines))
            .unwrap();

        assert_eq!(invoice.lines[0].line_total, dec("400.00"));
        assert_eq!(invoice.lines[1].line_total, dec("120.00"));
        assert_eq!(invoice.subtotal, dec("520.00"));
        assert_eq!(invoice.tax.total, dec("93.60"));
        assert_eq!(invoice.grand_total, dec("613.60"));
    }

    #[test]
    fn test_subtotal_is_exact_sum_of_line_totals() {
        let lines = vec![
            LineSpec::new("Lip Tint", 1, dec("12.5")),
            LineSpec::new("Vitamin C Serum", 3, dec("7.25")),
            LineSpec::new("Aloe Face Wash", 2, dec("0")),
        ];
        let invoice = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(lines))
            .unwrap();

        let summed: BigDecimal = invoice.lines.iter().map(|line| &line.line_total).sum();
        assert_eq!(invoice.subtotal, summed);
        assert_eq!(&invoice.tax.cgst + &invoice.tax.sgst, invoice.tax.total);
    }

    #[test]
    fn test_unknown_product_fails_whole_invoice() {
        let lines = vec![
            LineSpec::new("Lip Tint", 1, dec("0")),
            LineSpec::new("Glitter Bomb", 1, dec("0")),
        ];
        let err = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(lines))
            .unwrap_err();

        assert!(matches!(err, ComputeError::UnknownProduct(ref name) if name == "Glitter Bomb"));
    }

    #[test]
    fn test_empty_lines_rejected() {
        let err = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(Vec::new()))
            .unwrap_err();

        assert!(matches!(err, ComputeError::EmptyLines));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(vec![LineSpec::new("Lip Tint", 0, dec("0"))]))
            .unwrap_err();

        assert!(matches!(
            err,
            ComputeError::InvalidQuantity { ref product, quantity: 0 } if product == "Lip Tint"
        ));
    }

    #[test]
    fn test_discount_out_of_range_rejected() {
        let over = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(vec![LineSpec::new("Lip Tint", 1, dec("100.01"))]))
            .unwrap_err();
        assert!(matches!(over, ComputeError::DiscountOutOfRange { .. }));

        let negative = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(vec![LineSpec::new("Lip Tint", 1, dec("-1"))]))
            .unwrap_err();
        assert!(matches!(negative, ComputeError::DiscountOutOfRange { .. }));
    }

    #[test]
    fn test_full_discount_is_allowed() {
        let invoice = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), request(vec![LineSpec::new("Lip Tint", 2, dec("100"))]))
            .unwrap();

        assert_eq!(invoice.subtotal, BigDecimal::from(0));
        assert_eq!(invoice.grand_total, BigDecimal::from(0));
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let mut bad = request(vec![LineSpec::new("Lip Tint", 1, dec("0"))]);
        bad.customer = "   ".to_string();

        let err = engine(RoundingPolicy::CeilToInteger)
            .compute(&catalog(), bad)
            .unwrap_err();

        assert!(matches!(err, ComputeError::MissingField("customer")));
    }

    #[test]
    fn test_invalid_tax_rate_rejected_at_construction() {
        let err = InvoiceEngine::new(dec("1.5"), RoundingPolicy::CeilToInteger).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidTaxRate(_)));

        let err = InvoiceEngine::new(dec("-0.01"), RoundingPolicy::CeilToInteger).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidTaxRate(_)));
    }

    #[test]
    fn test_engine_from_config() {
        let config = BillingConfig::new(CompanyProfile {
            company_name: "Aurora Trading".to_string(),
            address_block: "1 Palm Avenue, Mumbai".to_string(),
            logo_image_path: None,
            footer_image_path: None,
            bank_details_block: "HDFC Bank, Ac No 1".to_string(),
            document_title: Default::default(),
        });
        let engine = InvoiceEngine::from_config(&config).unwrap();

        assert_eq!(engine.tax_rate(), &dec("0.18"));
        assert_eq!(engine.rounding(), RoundingPolicy::CeilToInteger);
    }

    #[test]
    fn test_request_fields_carry_into_invoice() {
        let invoice = engine(RoundingPolicy::RoundTwoDecimals)
            .compute(&catalog(), request(vec![LineSpec::new("Lip Tint", 1, dec("0"))]))
            .unwrap();

        assert_eq!(invoice.customer, "Sunrise Mart");
        assert_eq!(invoice.gstin, "27ABCDE1234F1Z5");
        assert_eq!(invoice.issued_on, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(invoice.rounding, RoundingPolicy::RoundTwoDecimals);
    }
}
