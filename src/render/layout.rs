//! Page composition for the invoice document
//!
//! Composition is a pure function from an invoice and a company profile to
//! a list of draw operations per page, in millimetres from the top-left of
//! an A4 page. Keeping this stage separate from the PDF backend makes the
//! band geometry testable and the output deterministic: equal invoices
//! compose to equal layouts, always.
//!
//! The cursor model follows the classic cell-flow convention: a cell is a
//! box the cursor moves through, a multi-line cell wraps its text to the
//! content width, and any cell that would cross the bottom margin pushes a
//! fresh page first. Header bands are emitted when a page opens; footer
//! bands are stamped after the body is fully laid out, once the final page
//! count is known.

use std::path::PathBuf;

use bigdecimal::{BigDecimal, RoundingMode};

use crate::config::CompanyProfile;
use crate::render::metrics::{text_width, wrap, PT_TO_MM};
use crate::types::Invoice;

/// A4 page width in millimetres
pub const PAGE_WIDTH: f64 = 210.0;
/// A4 page height in millimetres
pub const PAGE_HEIGHT: f64 = 297.0;
/// Left/right/top page margin
pub const MARGIN: f64 = 10.0;
/// Width available to content between the side margins
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
/// Classification code printed on every line
pub const HSN_SAC_CODE: &str = "3304";

/// A cell that would end below this line flows onto the next page
const PAGE_BREAK_Y: f64 = PAGE_HEIGHT - 20.0;
/// Horizontal inset between a cell edge and its text
const CELL_PADDING: f64 = 1.0;
/// Shading behind the line-item header row
const HEADER_FILL: (u8, u8, u8) = (200, 220, 255);
/// Column widths of the line-item table, left to right
const TABLE_WIDTHS: [f64; 8] = [10.0, 60.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0];
const TABLE_LABELS: [&str; 8] = [
    "S.No",
    "Description of Goods",
    "HSN/SAC",
    "GST Rate",
    "Qty",
    "Rate",
    "Disc. %",
    "Amount",
];

/// Typeface selector for the built-in font family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

/// Horizontal alignment of text within a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// One primitive drawing instruction, positioned from the page top-left
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline at `y`
    Text {
        x: f64,
        y: f64,
        face: FontFace,
        size: f64,
        text: String,
    },
    /// Horizontal rule from `x1` to `x2` at height `y`
    Rule { x1: f64, x2: f64, y: f64 },
    /// Cell box: optional background fill, optional border
    CellRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Option<(u8, u8, u8)>,
        border: bool,
    },
    /// Image placed with its top-left at (`x`, `y`), scaled to `width`
    /// preserving aspect ratio
    Image { path: PathBuf, x: f64, y: f64, width: f64 },
}

/// Draw operations for a single page, in paint order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

/// A fully composed document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// Number of pages the document occupies
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Compose the full invoice document for a company profile
pub fn compose(profile: &CompanyProfile, invoice: &Invoice) -> DocumentLayout {
    let mut c = Composer::new(profile);

    c.set_font(FontFace::Regular, 10.0);
    c.cell(100.0, 10.0, &format!("Party: {}", invoice.customer), HAlign::Left, Frame::None, false);
    c.cell(
        90.0,
        10.0,
        &format!("Date: {}", invoice.issued_on.format("%d-%m-%Y")),
        HAlign::Right,
        Frame::None,
        true,
    );
    c.cell(100.0, 10.0, &format!("GSTIN/UN: {}", invoice.gstin), HAlign::Left, Frame::None, false);
    c.cell(
        90.0,
        10.0,
        &format!("Contact: {}", invoice.contact),
        HAlign::Right,
        Frame::None,
        true,
    );

    c.cell(100.0, 10.0, "Address: ", HAlign::Left, Frame::None, true);
    c.set_font(FontFace::Regular, 9.0);
    c.multi_cell(10.0, &invoice.address, HAlign::Left);

    c.ln(10.0);

    c.set_font(FontFace::Bold, 9.0);
    for (width, label) in TABLE_WIDTHS.iter().zip(TABLE_LABELS) {
        c.cell(*width, 8.0, label, HAlign::Center, Frame::Shaded, false);
    }
    c.ln(8.0);

    c.set_font(FontFace::Regular, 9.0);
    let rate_label = format!("{}%", rate_percent(&invoice.tax.rate));
    for (idx, line) in invoice.lines.iter().enumerate() {
        c.cell(10.0, 8.0, &(idx + 1).to_string(), HAlign::Center, Frame::Border, false);
        c.cell(60.0, 8.0, &line.product, HAlign::Left, Frame::Border, false);
        c.cell(20.0, 8.0, HSN_SAC_CODE, HAlign::Center, Frame::Border, false);
        c.cell(20.0, 8.0, &rate_label, HAlign::Center, Frame::Border, false);
        c.cell(20.0, 8.0, &line.quantity.to_string(), HAlign::Center, Frame::Border, false);
        c.cell(20.0, 8.0, &fixed(&line.unit_price, 2), HAlign::Right, Frame::Border, false);
        c.cell(
            20.0,
            8.0,
            &format!("{}%", fixed(&line.discount_percent, 1)),
            HAlign::Right,
            Frame::Border,
            false,
        );
        c.cell(20.0, 8.0, &fixed(&line.line_total, 2), HAlign::Right, Frame::Border, false);
        c.ln(8.0);
    }

    c.ln(5.0);
    c.set_font(FontFace::Bold, 10.0);
    let half_label = invoice.tax.half_rate_percent();
    c.cell(160.0, 10.0, &format!("CGST ({half_label}%)"), HAlign::Right, Frame::None, false);
    c.cell(30.0, 10.0, &fixed(&invoice.tax.cgst, 2), HAlign::Right, Frame::Border, true);
    c.cell(160.0, 10.0, &format!("SGST ({half_label}%)"), HAlign::Right, Frame::None, false);
    c.cell(30.0, 10.0, &fixed(&invoice.tax.sgst, 2), HAlign::Right, Frame::Border, true);
    c.cell(160.0, 10.0, "Grand Total", HAlign::Right, Frame::None, false);
    c.cell(
        30.0,
        10.0,
        &format!("{} INR", invoice.grand_total),
        HAlign::Right,
        Frame::Border,
        true,
    );

    c.finish()
}

/// Amount formatted with exactly `scale` decimal places, rounded half-up
fn fixed(amount: &BigDecimal, scale: i64) -> String {
    amount.with_scale_round(scale, RoundingMode::HalfUp).to_string()
}

/// Tax rate as a whole-number-friendly percentage ("18" for 0.18)
fn rate_percent(rate: &BigDecimal) -> BigDecimal {
    (rate * BigDecimal::from(100)).normalized()
}

/// Cell framing: none, border only, or the shaded table-header fill
#[derive(Clone, Copy, PartialEq, Eq)]
enum Frame {
    None,
    Border,
    Shaded,
}

/// Cursor-driven page builder
struct Composer {
    company_name: String,
    address_block: String,
    bank_details_block: String,
    title: String,
    logo: Option<PathBuf>,
    footer_image: Option<PathBuf>,
    pages: Vec<PageLayout>,
    x: f64,
    y: f64,
    face: FontFace,
    size: f64,
}

impl Composer {
    fn new(profile: &CompanyProfile) -> Self {
        let mut composer = Self {
            company_name: profile.company_name.clone(),
            address_block: profile.address_block.clone(),
            bank_details_block: profile.bank_details_block.clone(),
            title: profile.document_title.to_string(),
            logo: profile.logo_image_path.clone(),
            footer_image: profile.footer_image_path.clone(),
            pages: Vec::new(),
            x: MARGIN,
            y: MARGIN,
            face: FontFace::Regular,
            size: 10.0,
        };
        composer.open_page();
        composer
    }

    fn set_font(&mut self, face: FontFace, size: f64) {
        self.face = face;
        self.size = size;
    }

    fn push(&mut self, op: DrawOp) {
        self.pages
            .last_mut()
            .expect("composer always holds an open page")
            .ops
            .push(op);
    }

    /// Start a new page and emit the header band onto it
    fn open_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.x = MARGIN;
        self.y = MARGIN;

        let saved = (self.face, self.size);
        if let Some(path) = self.logo.clone() {
            self.push(DrawOp::Image { path, x: MARGIN, y: 8.0, width: 33.0 });
        }
        self.set_font(FontFace::Bold, 16.0);
        let name = self.company_name.clone();
        self.cell(CONTENT_WIDTH, 10.0, &name, HAlign::Center, Frame::None, true);
        self.set_font(FontFace::Regular, 10.0);
        let address = self.address_block.clone();
        self.multi_cell(5.0, &address, HAlign::Center);
        self.set_font(FontFace::Bold, 14.0);
        let title = self.title.clone();
        self.cell(CONTENT_WIDTH, 10.0, &title, HAlign::Center, Frame::None, true);
        self.push(DrawOp::Rule { x1: MARGIN, x2: PAGE_WIDTH - MARGIN, y: self.y });
        self.ln(5.0);
        self.set_font(saved.0, saved.1);
    }

    /// Emit one cell and advance the cursor
    ///
    /// `line_break` returns the cursor to the left margin below the cell;
    /// otherwise the cursor moves to the cell's right edge. A cell that
    /// would cross the bottom margin opens the next page first, so rows
    /// never straddle a page boundary.
    fn cell(&mut self, w: f64, h: f64, text: &str, align: HAlign, frame: Frame, line_break: bool) {
        if self.y + h > PAGE_BREAK_Y {
            self.open_page();
        }
        if frame != Frame::None {
            self.push(DrawOp::CellRect {
                x: self.x,
                y: self.y,
                w,
                h,
                fill: (frame == Frame::Shaded).then_some(HEADER_FILL),
                border: true,
            });
        }
        if !text.is_empty() {
            let width = text_width(self.face, self.size, text);
            let tx = match align {
                HAlign::Left => self.x + CELL_PADDING,
                HAlign::Center => self.x + (w - width) / 2.0,
                HAlign::Right => self.x + w - CELL_PADDING - width,
            };
            self.push(DrawOp::Text {
                x: tx,
                y: self.y + h / 2.0 + baseline_drop(self.size),
                face: self.face,
                size: self.size,
                text: text.to_string(),
            });
        }
        if line_break {
            self.x = MARGIN;
            self.y += h;
        } else {
            self.x += w;
        }
    }

    /// Emit a full-width block of wrapped text, one cell row per line
    fn multi_cell(&mut self, h: f64, text: &str, align: HAlign) {
        let max = CONTENT_WIDTH - 2.0 * CELL_PADDING;
        for line in wrap(self.face, self.size, text, max) {
            self.cell(CONTENT_WIDTH, h, &line, align, Frame::None, true);
        }
    }

    fn ln(&mut self, h: f64) {
        self.x = MARGIN;
        self.y += h;
    }

    /// Stamp footer bands and return the finished document
    ///
    /// Footers are withheld until the body is complete so pagination is
    /// already resolved when the page indicators are written.
    fn finish(mut self) -> DocumentLayout {
        let bank_lines = wrap(
            FontFace::Italic,
            8.0,
            &self.bank_details_block,
            CONTENT_WIDTH - 2.0 * CELL_PADDING,
        );
        for (idx, page) in self.pages.iter_mut().enumerate() {
            if let Some(path) = self.footer_image.clone() {
                page.ops.push(DrawOp::Image { path, x: MARGIN, y: 265.0, width: 33.0 });
            }
            let mut y = PAGE_HEIGHT - 40.0;
            for line in &bank_lines {
                if !line.is_empty() {
                    let width = text_width(FontFace::Italic, 8.0, line);
                    page.ops.push(DrawOp::Text {
                        x: MARGIN + CONTENT_WIDTH - CELL_PADDING - width,
                        y: y + 2.5 + baseline_drop(8.0),
                        face: FontFace::Italic,
                        size: 8.0,
                        text: line.clone(),
                    });
                }
                y += 5.0;
            }
            let indicator = format!("Page {}", idx + 1);
            let width = text_width(FontFace::Italic, 8.0, &indicator);
            page.ops.push(DrawOp::Text {
                x: MARGIN + (CONTENT_WIDTH - width) / 2.0,
                y: y + 5.0 + baseline_drop(8.0),
                face: FontFace::Italic,
                size: 8.0,
                text: indicator,
            });
        }
        DocumentLayout { pages: self.pages }
    }
}

/// Distance from a cell's vertical midline down to the text baseline
fn baseline_drop(size: f64) -> f64 {
    0.3 * size * PT_TO_MM
}
