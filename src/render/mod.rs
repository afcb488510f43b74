//! Fixed-layout PDF rendering of computed invoices
//!
//! Rendering is split into two stages. [`layout`] composes an invoice and
//! a company profile into plain draw operations on A4 pages, using the
//! built-in Helvetica metrics from [`metrics`] for alignment and wrapping.
//! A private backend then materializes those operations into PDF bytes.
//! The split keeps the band geometry unit-testable without parsing PDFs,
//! and rendering stays pure: the caller decides where the bytes go.

pub mod layout;
pub mod metrics;

mod pdf;

pub use layout::*;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{BillingConfig, CompanyProfile};
use crate::types::Invoice;

/// Errors that can occur while rendering an invoice document
#[derive(Error, Debug)]
pub enum RenderError {
    /// A configured image path points to a file that does not exist
    #[error("image asset not found: {0}")]
    AssetMissing(PathBuf),
    /// The image file exists but could not be decoded
    #[error("failed to load image '{path}': {message}")]
    ImageLoad { path: PathBuf, message: String },
    /// The PDF backend rejected the document
    #[error("pdf backend error: {0}")]
    Pdf(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Renders computed invoices as PDF documents for one company profile
///
/// The renderer holds only the company identity; every call takes the
/// invoice to render, so one renderer serves any number of invoices.
#[derive(Debug, Clone)]
pub struct InvoiceRenderer {
    profile: CompanyProfile,
}

impl InvoiceRenderer {
    /// Create a renderer for a company profile
    pub fn new(profile: CompanyProfile) -> Self {
        Self { profile }
    }

    /// Create a renderer from a loaded deployment profile
    pub fn from_config(config: &BillingConfig) -> Self {
        Self::new(config.profile.clone())
    }

    /// The company profile this renderer stamps on every page
    pub fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    /// Compose the page layout without materializing PDF bytes
    pub fn layout(&self, invoice: &Invoice) -> DocumentLayout {
        compose(&self.profile, invoice)
    }

    /// Render an invoice to PDF bytes
    #[instrument(skip(self, invoice), fields(customer = %invoice.customer))]
    pub fn render(&self, invoice: &Invoice) -> RenderResult<Vec<u8>> {
        let layout = self.layout(invoice);
        let title = self.profile.document_title.to_string();
        let bytes = pdf::materialize(&layout, &title)?;
        info!(
            pages = layout.page_count(),
            bytes = bytes.len(),
            "rendered invoice document"
        );
        Ok(bytes)
    }
}

/// Default file name for a rendered invoice
///
/// Combines the customer name with a generation timestamp, replacing any
/// character unsafe in file names with `_`.
pub fn suggested_filename(invoice: &Invoice, generated_at: NaiveDateTime) -> String {
    let mut party = String::with_capacity(invoice.customer.len());
    for ch in invoice.customer.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' || ch == ' ';
        party.push(if ok { ch } else { '_' });
    }
    let party = party.trim();
    let party = if party.is_empty() { "party" } else { party };
    format!("invoice_{party}_{}.pdf", generated_at.format("%Y%m%d%H%M%S"))
}
