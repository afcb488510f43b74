//! # Billing Core
//!
//! A GST billing library for small retail businesses: CSV reference
//! tables, invoice computation with the CGST/SGST split, fixed-layout PDF
//! rendering, and an append-only sales ledger.
//!
//! ## Features
//!
//! - **Reference tables**: Products with per-category prices, outlets,
//!   employees, and parties loaded from CSV files
//! - **Invoice computation**: Exact decimal arithmetic, per-line percent
//!   discounts, and configurable grand-total rounding
//! - **GST breakdown**: One configurable rate, split into equal CGST and
//!   SGST halves
//! - **PDF rendering**: Fixed-layout A4 invoices with automatic page flow
//!   and header/footer bands repeated on every page
//! - **Sales ledger**: One append-only CSV row per generated invoice
//!
//! ## Quick Start
//!
//! ```rust
//! use billing_core::{Catalog, InvoiceEngine, InvoiceRequest, LineSpec, Product, RoundingPolicy};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//! use std::collections::HashMap;
//! use std::str::FromStr;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_tables(
//!     vec![Product {
//!         name: "Lip Tint".into(),
//!         unit_price: BigDecimal::from_str("500.00")?,
//!         category_prices: HashMap::new(),
//!     }],
//!     Vec::new(),
//!     Vec::new(),
//!     Vec::new(),
//! );
//!
//! let engine = InvoiceEngine::new(BigDecimal::from_str("0.18")?, RoundingPolicy::CeilToInteger)?;
//! let invoice = engine.compute(
//!     &catalog,
//!     InvoiceRequest {
//!         customer: "Sunrise Mart".into(),
//!         gstin: "27AABCS1234A1Z5".into(),
//!         contact: "9876501234".into(),
//!         address: "14 Hill Road, Mumbai".into(),
//!         issued_on: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
//!         lines: vec![LineSpec::new("Lip Tint", 3, BigDecimal::from_str("10")?)],
//!     },
//! )?;
//!
//! assert_eq!(invoice.grand_total, BigDecimal::from(1593));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod render;
pub mod tax;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use catalog::*;
pub use config::*;
pub use engine::*;
pub use ledger::*;
pub use render::*;
pub use tax::gst::*;
pub use types::*;
