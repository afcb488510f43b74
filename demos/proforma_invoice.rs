//! Proforma invoice example: quoting a registered party at two-decimal totals

use billing_core::{
    suggested_filename, BillingConfig, Catalog, CatalogPaths, CsvLedger, InvoiceEngine,
    InvoiceRenderer, InvoiceRequest, LedgerRecord, LedgerSink, LineSpec,
};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::Local;
use std::path::Path;
use std::str::FromStr;
use std::{env, fs};
use tracing_subscriber::EnvFilter;

fn fixed2(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("🧾 Billing Core - Proforma Invoice Example\n");

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

    // 1. Load products and registered parties
    println!("📊 Loading reference tables...");
    let paths = CatalogPaths::new(root.join("data/products.csv"))
        .with_parties(root.join("data/parties.csv"));
    let catalog = Catalog::load(&paths)?;
    println!("  ✓ Parties: {}", catalog.party_names().join(", "));

    let config = BillingConfig::from_json_file(root.join("profiles/proforma.json"))?;
    let engine = InvoiceEngine::from_config(&config)?;
    println!(
        "  ✓ Document title: {}\n",
        config.profile.document_title
    );

    // 2. Quote a party with its billing details prefilled from the table
    let party = catalog
        .find_party("Deccan Wholesale Co")
        .ok_or("party missing from parties table")?
        .clone();
    println!("💰 Quoting {} with negotiated discounts...", party.name);

    let invoice = engine.compute(
        &catalog,
        InvoiceRequest {
            customer: party.name.clone(),
            gstin: party.gstin.clone(),
            // the parties table carries no phone numbers
            contact: "9833012345".to_string(),
            address: party.address.clone(),
            issued_on: Local::now().date_naive(),
            lines: vec![
                LineSpec::new("Matte Foundation", 10, BigDecimal::from(10)),
                LineSpec::new("Herbal Shampoo", 24, BigDecimal::from_str("12.5")?),
            ],
        },
    )?;

    for line in &invoice.lines {
        println!(
            "  ✓ {} x{} @ ₹{} less {}% = ₹{}",
            line.product,
            line.quantity,
            line.unit_price,
            line.discount_percent.normalized(),
            fixed2(&line.line_total)
        );
    }
    println!();
    println!("  Subtotal:    ₹{}", fixed2(&invoice.subtotal));
    println!(
        "  CGST ({}%):   ₹{}",
        invoice.tax.half_rate_percent(),
        fixed2(&invoice.tax.cgst)
    );
    println!(
        "  SGST ({}%):   ₹{}",
        invoice.tax.half_rate_percent(),
        fixed2(&invoice.tax.sgst)
    );
    println!("  Grand Total: ₹{} (kept at two decimals)", invoice.grand_total);

    // 3. Render and store the document
    println!("\n📄 Rendering PDF...");
    let renderer = InvoiceRenderer::from_config(&config);
    let bytes = renderer.render(&invoice)?;

    let output = env::temp_dir().join(suggested_filename(&invoice, Local::now().naive_local()));
    fs::write(&output, &bytes)?;
    println!("  ✓ Wrote {} ({} bytes)", output.display(), bytes.len());

    // 4. Proforma quotes get their own ledger file
    let ledger_path = env::temp_dir().join("proforma-ledger.csv");
    let mut ledger = CsvLedger::new(&ledger_path);
    ledger.append(&LedgerRecord::from_invoice(&invoice))?;
    println!("  ✓ Appended ledger row to {}", ledger_path.display());

    println!("\n🎉 Proforma invoice generated successfully!");
    Ok(())
}
