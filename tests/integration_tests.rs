//! Integration tests for billing-core

use billing_core::{
    suggested_filename,
    utils::MemoryLedger,
    BillingConfig, Catalog, CatalogPaths, ComputeError, CsvLedger, DrawOp, InvoiceEngine,
    InvoiceRenderer, InvoiceRequest, LedgerRecord, LedgerSink, LineSpec, RenderError,
    RoundingPolicy,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use std::str::FromStr;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// Write the four reference tables the way the source spreadsheets look
fn write_reference_tables(dir: &Path) -> CatalogPaths {
    fs::write(
        dir.join("products.csv"),
        "Product Name,Price,Gold,Silver\n\
         Lip Tint,500.00,450.00,475.00\n\
         Kajal Pencil,249.50,224.55,\n\
         Vitamin C Serum,899.00,809.10,854.05\n",
    )
    .unwrap();
    fs::write(
        dir.join("outlets.csv"),
        "Shop Name,Address,GST,Contact\n\
         Sunrise Mart,\"14 Hill Road, Bandra West, Mumbai 400050\",27AABCS1234A1Z5,9876501234\n\
         Moonlight Stores,\"2 Palm Court, Andheri East, Mumbai 400069\",27AABCM9012B1Z7,9822204455\n",
    )
    .unwrap();
    fs::write(
        dir.join("persons.csv"),
        "Employee Name,Discount Category\n\
         Asha Nair,Gold\n\
         Rohan Shetty,Silver\n",
    )
    .unwrap();
    fs::write(
        dir.join("parties.csv"),
        "Party,Address,GSTIN/UN\n\
         Nilgiri Supermart,\"6 Lake View Road, Powai, Mumbai 400076\",27AADCN5678C1Z3\n",
    )
    .unwrap();

    CatalogPaths::new(dir.join("products.csv"))
        .with_outlets(dir.join("outlets.csv"))
        .with_employees(dir.join("persons.csv"))
        .with_parties(dir.join("parties.csv"))
}

fn write_profile(dir: &Path, file: &str, title: &str, rounding: &str) -> std::path::PathBuf {
    let path = dir.join(file);
    fs::write(
        &path,
        format!(
            r#"{{
    "companyName": "Aurora Trading International (OPC) Pvt Ltd",
    "addressBlock": "23B Mastermind Park, Palm Avenue,\nGoregaon East, Mumbai 400065.\nGSTIN/UIN: 27AABCA1234B1Z8\nState Name : Maharashtra, Code : 27",
    "bankDetailsBlock": "HDFC Bank: Ac No 50200011122233, IFSC HDFC0001019\nMobile - 9800000000 / GPay / PhonePe",
    "documentTitle": "{title}",
    "taxRate": "0.18",
    "grandTotalRounding": "{rounding}"
}}"#
        ),
    )
    .unwrap();
    path
}

fn page_texts(layout: &billing_core::DocumentLayout) -> Vec<&str> {
    layout
        .pages
        .iter()
        .flat_map(|page| page.ops.iter())
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_complete_billing_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_reference_tables(dir.path());
    let profile_path = write_profile(dir.path(), "invoice.json", "Invoice", "ceil-to-integer");

    // Load reference tables and the deployment profile
    let catalog = Catalog::load(&paths).unwrap();
    let config = BillingConfig::from_json_file(&profile_path).unwrap();
    let engine = InvoiceEngine::from_config(&config).unwrap();

    // Bill a registered outlet with the employee's category discounts
    let outlet = catalog.find_outlet("Sunrise Mart").unwrap().clone();
    let employee = catalog.find_employee("Asha Nair").unwrap().clone();
    let discount_for = |product: &str| {
        catalog
            .discount_percent_for(product, &employee.discount_category)
            .unwrap()
    };

    let invoice = engine
        .compute(
            &catalog,
            InvoiceRequest {
                customer: outlet.name.clone(),
                gstin: outlet.gstin.clone(),
                contact: outlet.contact.clone(),
                address: outlet.address.clone(),
                issued_on: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                lines: vec![
                    LineSpec::new("Lip Tint", 3, discount_for("Lip Tint")),
                    LineSpec::new("Kajal Pencil", 2, discount_for("Kajal Pencil")),
                ],
            },
        )
        .unwrap();

    // Gold prices are 10% off both products
    assert_eq!(invoice.lines[0].discount_percent, dec("10"));
    assert_eq!(invoice.lines[0].line_total, dec("1350.00"));
    assert_eq!(invoice.lines[1].line_total, dec("449.10"));
    assert_eq!(invoice.subtotal, dec("1799.10"));
    assert_eq!(invoice.tax.cgst, dec("161.919"));
    assert_eq!(invoice.tax.sgst, dec("161.919"));
    assert_eq!(invoice.grand_total, dec("2123"));

    // Render the document and write it where the demo apps would
    let renderer = InvoiceRenderer::from_config(&config);
    let bytes = renderer.render(&invoice).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let generated_at = NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let pdf_path = dir.path().join(suggested_filename(&invoice, generated_at));
    fs::write(&pdf_path, &bytes).unwrap();
    assert!(pdf_path.exists());

    // Append to the running ledger
    let ledger_path = dir.path().join("billing.csv");
    let mut ledger = CsvLedger::new(&ledger_path);
    ledger.append(&LedgerRecord::from_invoice(&invoice)).unwrap();

    // Next sale goes under the same header
    let second = engine
        .compute(
            &catalog,
            InvoiceRequest {
                customer: "Moonlight Stores".to_string(),
                gstin: "27AABCM9012B1Z7".to_string(),
                contact: "9822204455".to_string(),
                address: "2 Palm Court, Andheri East, Mumbai 400069".to_string(),
                issued_on: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
                lines: vec![LineSpec::new("Vitamin C Serum", 1, dec("0"))],
            },
        )
        .unwrap();
    ledger.append(&LedgerRecord::from_invoice(&second)).unwrap();

    let content = fs::read_to_string(&ledger_path).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert_eq!(content.lines().filter(|l| l.starts_with("Party,")).count(), 1);

    // Rows read back exactly as written
    let mut reader = csv::Reader::from_path(&ledger_path).unwrap();
    let rows: Vec<LedgerRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows[0], LedgerRecord::from_invoice(&invoice));
    assert_eq!(rows[0].products, "Lip Tint, Kajal Pencil");
    assert_eq!(rows[0].quantities, "3, 2");
    assert_eq!(rows[0].date, "01-07-2024");
    assert_eq!(rows[1], LedgerRecord::from_invoice(&second));
    assert_eq!(rows[1].grand_total, dec("1061"));
}

#[test]
fn test_proforma_billing_for_registered_party() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_reference_tables(dir.path());
    let profile_path = write_profile(
        dir.path(),
        "proforma.json",
        "Proforma Invoice",
        "round-2-decimal",
    );

    let catalog = Catalog::load(&paths).unwrap();
    let config = BillingConfig::from_json_file(&profile_path).unwrap();
    let engine = InvoiceEngine::from_config(&config).unwrap();

    // Party details come prefilled from the parties table
    let party = catalog.find_party("Nilgiri Supermart").unwrap().clone();
    let invoice = engine
        .compute(
            &catalog,
            InvoiceRequest {
                customer: party.name.clone(),
                gstin: party.gstin.clone(),
                contact: "9833012345".to_string(),
                address: party.address.clone(),
                issued_on: NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(),
                lines: vec![
                    LineSpec::new("Lip Tint", 1, dec("0")),
                    LineSpec::new("Kajal Pencil", 1, dec("0")),
                ],
            },
        )
        .unwrap();

    // 749.50 + 18% = 884.41, kept at two decimals under this profile
    assert_eq!(invoice.rounding, RoundingPolicy::RoundTwoDecimals);
    assert_eq!(invoice.grand_total, dec("884.41"));

    let renderer = InvoiceRenderer::from_config(&config);
    let layout = renderer.layout(&invoice);
    let texts = page_texts(&layout);
    assert!(texts.contains(&"Proforma Invoice"));
    assert!(texts.contains(&"884.41 INR"));
    assert!(texts.contains(&"Party: Nilgiri Supermart"));

    let bytes = renderer.render(&invoice).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_long_invoice_spills_onto_following_pages() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_reference_tables(dir.path());
    let profile_path = write_profile(dir.path(), "invoice.json", "Invoice", "ceil-to-integer");

    let catalog = Catalog::load(&paths).unwrap();
    let config = BillingConfig::from_json_file(&profile_path).unwrap();
    let engine = InvoiceEngine::from_config(&config).unwrap();

    let lines = (0..40)
        .map(|_| LineSpec::new("Lip Tint", 1, dec("0")))
        .collect();
    let invoice = engine
        .compute(
            &catalog,
            InvoiceRequest {
                customer: "Sunrise Mart".to_string(),
                gstin: "27AABCS1234A1Z5".to_string(),
                contact: "9876501234".to_string(),
                address: "14 Hill Road, Bandra West, Mumbai 400050".to_string(),
                issued_on: NaiveDate::from_ymd_opt(2024, 7, 4).unwrap(),
                lines,
            },
        )
        .unwrap();

    let renderer = InvoiceRenderer::from_config(&config);
    let layout = renderer.layout(&invoice);
    assert_eq!(layout.page_count(), 2);

    let texts = page_texts(&layout);
    assert!(texts.contains(&"Page 1"));
    assert!(texts.contains(&"Page 2"));

    let bytes = renderer.render(&invoice).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_unknown_product_leaves_no_ledger_row() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_reference_tables(dir.path());
    let catalog = Catalog::load(&paths).unwrap();
    let engine = InvoiceEngine::new(dec("0.18"), RoundingPolicy::CeilToInteger).unwrap();

    let err = engine
        .compute(
            &catalog,
            InvoiceRequest {
                customer: "Sunrise Mart".to_string(),
                gstin: "27AABCS1234A1Z5".to_string(),
                contact: "9876501234".to_string(),
                address: "14 Hill Road, Bandra West, Mumbai 400050".to_string(),
                issued_on: NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
                lines: vec![LineSpec::new("Eyeliner", 1, dec("0"))],
            },
        )
        .unwrap_err();

    assert!(matches!(err, ComputeError::UnknownProduct(name) if name == "Eyeliner"));

    // Nothing was billed, so nothing reaches the ledger
    let ledger_path = dir.path().join("billing.csv");
    assert!(!ledger_path.exists());
}

#[test]
fn test_missing_logo_asset_fails_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_reference_tables(dir.path());
    let profile_path = write_profile(dir.path(), "invoice.json", "Invoice", "ceil-to-integer");

    let catalog = Catalog::load(&paths).unwrap();
    let mut config = BillingConfig::from_json_file(&profile_path).unwrap();
    config.profile.logo_image_path = Some(dir.path().join("missing-logo.png"));

    let engine = InvoiceEngine::from_config(&config).unwrap();
    let invoice = engine
        .compute(
            &catalog,
            InvoiceRequest {
                customer: "Sunrise Mart".to_string(),
                gstin: "27AABCS1234A1Z5".to_string(),
                contact: "9876501234".to_string(),
                address: "14 Hill Road, Bandra West, Mumbai 400050".to_string(),
                issued_on: NaiveDate::from_ymd_opt(2024, 7, 6).unwrap(),
                lines: vec![LineSpec::new("Lip Tint", 1, dec("0"))],
            },
        )
        .unwrap();

    let renderer = InvoiceRenderer::from_config(&config);
    let err = renderer.render(&invoice).unwrap_err();
    assert!(matches!(err, RenderError::AssetMissing(_)));
}

/// Sink double that refuses every append
struct FailingSink;

impl LedgerSink for FailingSink {
    fn append(&mut self, _record: &LedgerRecord) -> billing_core::LedgerResult<()> {
        Err(billing_core::LedgerError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "ledger file is read-only",
        )))
    }
}

#[test]
fn test_sink_failure_does_not_invalidate_rendered_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_reference_tables(dir.path());
    let profile_path = write_profile(dir.path(), "invoice.json", "Invoice", "ceil-to-integer");

    let catalog = Catalog::load(&paths).unwrap();
    let config = BillingConfig::from_json_file(&profile_path).unwrap();
    let engine = InvoiceEngine::from_config(&config).unwrap();

    let invoice = engine
        .compute(
            &catalog,
            InvoiceRequest {
                customer: "Sunrise Mart".to_string(),
                gstin: "27AABCS1234A1Z5".to_string(),
                contact: "9876501234".to_string(),
                address: "14 Hill Road, Bandra West, Mumbai 400050".to_string(),
                issued_on: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
                lines: vec![LineSpec::new("Lip Tint", 2, dec("0"))],
            },
        )
        .unwrap();

    // The document is rendered before the ledger is touched
    let bytes = InvoiceRenderer::from_config(&config).render(&invoice).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    // An append failure surfaces as its own error, the bytes stay usable
    let err = FailingSink.append(&LedgerRecord::from_invoice(&invoice)).unwrap_err();
    assert!(matches!(err, billing_core::LedgerError::Io(_)));
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_csv_and_memory_sinks_agree() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_reference_tables(dir.path());
    let catalog = Catalog::load(&paths).unwrap();
    let engine = InvoiceEngine::new(dec("0.18"), RoundingPolicy::CeilToInteger).unwrap();

    let ledger_path = dir.path().join("billing.csv");
    let mut csv_ledger = CsvLedger::new(&ledger_path);
    let mut memory_ledger = MemoryLedger::new();

    for (customer, product, quantity) in [
        ("Sunrise Mart", "Lip Tint", 3),
        ("Moonlight Stores", "Kajal Pencil", 5),
        ("Nilgiri Supermart", "Vitamin C Serum", 2),
    ] {
        let invoice = engine
            .compute(
                &catalog,
                InvoiceRequest {
                    customer: customer.to_string(),
                    gstin: "27AABCS1234A1Z5".to_string(),
                    contact: "9876501234".to_string(),
                    address: "14 Hill Road, Bandra West, Mumbai 400050".to_string(),
                    issued_on: NaiveDate::from_ymd_opt(2024, 7, 7).unwrap(),
                    lines: vec![LineSpec::new(product, quantity, dec("0"))],
                },
            )
            .unwrap();
        let record = LedgerRecord::from_invoice(&invoice);
        csv_ledger.append(&record).unwrap();
        memory_ledger.append(&record).unwrap();
    }

    let mut reader = csv::Reader::from_path(&ledger_path).unwrap();
    let rows: Vec<LedgerRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows, memory_ledger.records());
}
