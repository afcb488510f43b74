//! Core types and data structures for the billing system

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::tax::gst::GstBreakdown;

/// A sellable product from the reference catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product name, the unique lookup key
    pub name: String,
    /// Base unit price before any discount
    pub unit_price: BigDecimal,
    /// Discounted unit prices keyed by discount category; sparse, only
    /// categories priced for this product appear
    pub category_prices: HashMap<String, BigDecimal>,
}

/// A retail outlet that can be billed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlet {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub contact: String,
}

/// An employee entitled to a discount category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub discount_category: String,
}

/// A registered party with prefilled billing details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub gstin: String,
}

/// One requested invoice line: product name, quantity, discount percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub product: String,
    pub quantity: u32,
    pub discount_percent: BigDecimal,
}

impl LineSpec {
    pub fn new(product: impl Into<String>, quantity: u32, discount_percent: BigDecimal) -> Self {
        Self {
            product: product.into(),
            quantity,
            discount_percent,
        }
    }
}

/// A computed invoice line with derived amounts at full precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: String,
    pub quantity: u32,
    /// Base unit price from the catalog
    pub unit_price: BigDecimal,
    /// Discount applied to the unit price, in percent
    pub discount_percent: BigDecimal,
    /// unit price x (1 - discount/100), not rounded
    pub discounted_unit_price: BigDecimal,
    /// discounted unit price x quantity, not rounded
    pub line_total: BigDecimal,
}

/// Grand-total rounding policies observed across deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundingPolicy {
    /// Round the grand total up to the next whole currency unit
    #[default]
    #[serde(rename = "ceil-to-integer")]
    CeilToInteger,
    /// Round the grand total half-up to two decimal places
    #[serde(rename = "round-2-decimal")]
    RoundTwoDecimals,
}

impl RoundingPolicy {
    /// Apply this policy to an exact pre-rounding total
    pub fn apply(&self, amount: BigDecimal) -> BigDecimal {
        match self {
            RoundingPolicy::CeilToInteger => amount.with_scale_round(0, RoundingMode::Ceiling),
            RoundingPolicy::RoundTwoDecimals => amount.with_scale_round(2, RoundingMode::HalfUp),
        }
    }
}

/// A fully computed invoice, ready for rendering and bookkeeping
///
/// Amounts are exact: line totals sum to the subtotal with no per-line
/// rounding, and the GST halves are each exactly half the tax amount.
/// Only the grand total carries the deployment's rounding policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub customer: String,
    pub gstin: String,
    pub contact: String,
    pub address: String,
    pub issued_on: NaiveDate,
    pub lines: Vec<LineItem>,
    /// Sum of line totals, full precision
    pub subtotal: BigDecimal,
    /// GST on the subtotal, split into equal CGST/SGST halves
    pub tax: GstBreakdown,
    /// subtotal + tax after the rounding policy
    pub grand_total: BigDecimal,
    /// Policy the grand total was rounded under
    pub rounding: RoundingPolicy,
}

/// Flattened invoice snapshot appended to the running ledger table
///
/// Field renames pin the on-disk header row; rows are written once and
/// never mutated. Subtotal and tax keep their exact computed values, the
/// grand total is stored as rounded by the invoice's policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "Party")]
    pub party: String,
    #[serde(rename = "GSTIN/UN")]
    pub gstin: String,
    #[serde(rename = "Contact Number")]
    pub contact: String,
    #[serde(rename = "Address")]
    pub address: String,
    /// Issue date as dd-mm-YYYY
    #[serde(rename = "Date")]
    pub date: String,
    /// Product names joined with ", "
    #[serde(rename = "Selected Products")]
    pub products: String,
    /// Quantities joined with ", ", in line order
    #[serde(rename = "Quantities")]
    pub quantities: String,
    #[serde(rename = "Total Price", deserialize_with = "money_from_str")]
    pub total_price: BigDecimal,
    #[serde(rename = "Tax Amount", deserialize_with = "money_from_str")]
    pub tax_amount: BigDecimal,
    #[serde(rename = "Grand Total", deserialize_with = "money_from_str")]
    pub grand_total: BigDecimal,
}

/// Re-parse a money cell from its decimal string
///
/// Readers that guess cell types hand these columns over as binary
/// floats, which cannot carry values like 314.8200.
fn money_from_str<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    BigDecimal::from_str(&raw).map_err(serde::de::Error::custom)
}

impl LedgerRecord {
    /// Flatten an invoice into one ledger row
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let products = invoice
            .lines
            .iter()
            .map(|line| line.product.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let quantities = invoice
            .lines
            .iter()
            .map(|line| line.quantity.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            party: invoice.customer.clone(),
            gstin: invoice.gstin.clone(),
            contact: invoice.contact.clone(),
            address: invoice.address.clone(),
            date: invoice.issued_on.format("%d-%m-%Y").to_string(),
            products,
            quantities,
            total_price: invoice.subtotal.clone(),
            tax_amount: invoice.tax.total.clone(),
            grand_total: invoice.grand_total.clone(),
        }
    }
}
