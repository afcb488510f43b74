//! Invoice generation example: outlet billing with employee discounts

use billing_core::{
    suggested_filename, BillingConfig, Catalog, CatalogPaths, CsvLedger, InvoiceEngine,
    InvoiceRenderer, InvoiceRequest, LedgerRecord, LedgerSink, LineSpec,
};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::Local;
use std::path::Path;
use std::{env, fs};
use tracing_subscriber::EnvFilter;

fn fixed2(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("🧾 Billing Core - Invoice Generation Example\n");

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

    // 1. Load the reference tables and the deployment profile
    println!("📊 Loading reference tables...");
    let paths = CatalogPaths::new(root.join("data/products.csv"))
        .with_outlets(root.join("data/outlets.csv"))
        .with_employees(root.join("data/persons.csv"))
        .with_parties(root.join("data/parties.csv"));
    let catalog = Catalog::load(&paths)?;
    println!("  ✓ Products: {}", catalog.product_names().join(", "));
    println!("  ✓ Outlets:  {}", catalog.outlet_names().join(", "));

    let config = BillingConfig::from_json_file(root.join("profiles/invoice.json"))?;
    let engine = InvoiceEngine::from_config(&config)?;
    println!(
        "  ✓ Profile: {} ({:?} rounding)\n",
        config.profile.company_name, config.grand_total_rounding
    );

    // 2. Bill an outlet at the employee's category prices
    let outlet = catalog
        .find_outlet("Sunrise Mart")
        .ok_or("outlet missing from outlets table")?
        .clone();
    let employee = catalog
        .find_employee("Asha Nair")
        .ok_or("employee missing from persons table")?
        .clone();
    println!(
        "💰 Billing {} at {}'s {} category prices...",
        outlet.name, employee.name, employee.discount_category
    );

    let selection = [("Lip Tint", 3), ("Vitamin C Serum", 1), ("Rose Night Cream", 2)];
    let mut lines = Vec::new();
    for (product, quantity) in selection {
        let discount = catalog
            .discount_percent_for(product, &employee.discount_category)
            .unwrap_or_else(|| BigDecimal::from(0));
        lines.push(LineSpec::new(product, quantity, discount));
    }

    let invoice = engine.compute(
        &catalog,
        InvoiceRequest {
            customer: outlet.name.clone(),
            gstin: outlet.gstin.clone(),
            contact: outlet.contact.clone(),
            address: outlet.address.clone(),
            issued_on: Local::now().date_naive(),
            lines,
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
    println!("  Grand Total: ₹{}", invoice.grand_total);

    // 3. Render the PDF document
    println!("\n📄 Rendering PDF...");
    let renderer = InvoiceRenderer::from_config(&config);
    let bytes = renderer.render(&invoice)?;

    let output = env::temp_dir().join(suggested_filename(&invoice, Local::now().naive_local()));
    fs::write(&output, &bytes)?;
    println!("  ✓ Wrote {} ({} bytes)", output.display(), bytes.len());

    // 4. Append the sale to the running ledger
    let ledger_path = env::temp_dir().join("billing-ledger.csv");
    let mut ledger = CsvLedger::new(&ledger_path);
    ledger.append(&LedgerRecord::from_invoice(&invoice))?;
    println!("  ✓ Appended ledger row to {}", ledger_path.display());

    println!("\n🎉 Invoice generated successfully!");
    Ok(())
}
