//! Deployment configuration for the billing pipeline
//!
//! A deployment profile bundles the company identity the renderer prints
//! with the knobs the engine computes under. Profiles load from JSON
//! files with camelCase keys; the tax rate travels as a decimal string
//! so it stays exact.
//!
//! ```json
//! {
//!   "companyName": "Aurora Trading International (OPC) Pvt Ltd",
//!   "addressBlock": "23B Mastermind Park, Palm Avenue,\n...",
//!   "logoImagePath": null,
//!   "footerImagePath": null,
//!   "bankDetailsBlock": "HDFC Bank, ...",
//!   "documentTitle": "Invoice",
//!   "taxRate": "0.18",
//!   "grandTotalRounding": "ceil-to-integer"
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::RoundingPolicy;

/// Errors that can occur while loading a deployment profile
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse profile: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Document heading printed at the top of every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentTitle {
    #[default]
    #[serde(rename = "Invoice")]
    Invoice,
    #[serde(rename = "Proforma Invoice")]
    ProformaInvoice,
}

impl fmt::Display for DocumentTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentTitle::Invoice => f.write_str("Invoice"),
            DocumentTitle::ProformaInvoice => f.write_str("Proforma Invoice"),
        }
    }
}

/// Company identity rendered on every document page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Company name, centered bold at the top of the page
    pub company_name: String,
    /// Multi-line address/GSTIN block printed under the name
    pub address_block: String,
    /// Logo for the top-left corner; `None` skips the logo entirely
    #[serde(default)]
    pub logo_image_path: Option<PathBuf>,
    /// Image for the bottom-left corner; `None` skips it entirely
    #[serde(default)]
    pub footer_image_path: Option<PathBuf>,
    /// Multi-line bank details, right-aligned in the page footer
    pub bank_details_block: String,
    /// Heading: "Invoice" or "Proforma Invoice"
    #[serde(default)]
    pub document_title: DocumentTitle,
}

/// Full deployment profile: company identity plus engine knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfig {
    #[serde(flatten)]
    pub profile: CompanyProfile,
    /// Tax rate as a fraction of the subtotal
    #[serde(default = "default_tax_rate")]
    pub tax_rate: BigDecimal,
    /// How the grand total is rounded
    #[serde(default)]
    pub grand_total_rounding: RoundingPolicy,
}

/// The standard 18% GST rate as an exact decimal
fn default_tax_rate() -> BigDecimal {
    BigDecimal::from(18) / BigDecimal::from(100)
}

impl BillingConfig {
    /// Wrap a company profile with the default rate and rounding
    pub fn new(profile: CompanyProfile) -> Self {
        Self {
            profile,
            tax_rate: default_tax_rate(),
            grand_total_rounding: RoundingPolicy::default(),
        }
    }

    /// Load a deployment profile from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            title = %config.profile.document_title,
            rounding = ?config.grand_total_rounding,
            "loaded deployment profile"
        );
        Ok(config)
    }
}
