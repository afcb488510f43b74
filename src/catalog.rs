//! Read-only reference tables backing invoice computation
//!
//! The four tables (products, outlets, employees, parties) are loaded once
//! from CSV at startup and injected by shared reference into the rest of the
//! pipeline. Lookups are exact-match by name and return `Option` rather than
//! an error so callers can surface their own not-found message.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::types::{Employee, Outlet, Party, Product};

const PRODUCT_NAME_COLUMN: &str = "Product Name";
const PRICE_COLUMN: &str = "Price";

/// Errors raised while loading reference tables
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read reference table: {0}")]
    Csv(#[from] csv::Error),
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("invalid price '{value}' for product '{product}'")]
    InvalidPrice { product: String, value: String },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Locations of the reference tables for one deployment
///
/// Only the products table is required; deployments that bill parties from
/// a single table leave the others unset and get empty tables instead.
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    pub products: PathBuf,
    pub outlets: Option<PathBuf>,
    pub employees: Option<PathBuf>,
    pub parties: Option<PathBuf>,
}

impl CatalogPaths {
    /// Reference tables with only the products file set
    pub fn new(products: impl Into<PathBuf>) -> Self {
        Self {
            products: products.into(),
            outlets: None,
            employees: None,
            parties: None,
        }
    }

    /// Set the outlets table path
    pub fn with_outlets(mut self, path: impl Into<PathBuf>) -> Self {
        self.outlets = Some(path.into());
        self
    }

    /// Set the employees table path
    pub fn with_employees(mut self, path: impl Into<PathBuf>) -> Self {
        self.employees = Some(path.into());
        self
    }

    /// Set the parties table path
    pub fn with_parties(mut self, path: impl Into<PathBuf>) -> Self {
        self.parties = Some(path.into());
        self
    }
}

/// In-memory snapshot of the reference tables, immutable for the process
/// lifetime
///
/// Tables keep file order so pickers can list names the way the source
/// spreadsheets do; rows after the first with a given name are dropped.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    product_index: HashMap<String, usize>,
    outlets: Vec<Outlet>,
    outlet_index: HashMap<String, usize>,
    employees: Vec<Employee>,
    employee_index: HashMap<String, usize>,
    parties: Vec<Party>,
    party_index: HashMap<String, usize>,
}

impl Catalog {
    /// Load all configured tables from disk
    #[instrument(skip(paths), fields(products = %paths.products.display()))]
    pub fn load(paths: &CatalogPaths) -> CatalogResult<Self> {
        let products = load_products(&paths.products)?;
        let outlets = match &paths.outlets {
            Some(path) => load_outlets(path)?,
            None => Vec::new(),
        };
        let employees = match &paths.employees {
            Some(path) => load_employees(path)?,
            None => Vec::new(),
        };
        let parties = match &paths.parties {
            Some(path) => load_parties(path)?,
            None => Vec::new(),
        };

        info!(
            products = products.len(),
            outlets = outlets.len(),
            employees = employees.len(),
            parties = parties.len(),
            "loaded reference tables"
        );

        Ok(Self::from_tables(products, outlets, employees, parties))
    }

    /// Build a catalog from already-materialized tables
    ///
    /// Useful when rows come from somewhere other than CSV files, and for
    /// tests. Duplicate names keep the first row.
    pub fn from_tables(
        products: Vec<Product>,
        outlets: Vec<Outlet>,
        employees: Vec<Employee>,
        parties: Vec<Party>,
    ) -> Self {
        let (products, product_index) = index_by_name(products, |p| &p.name);
        let (outlets, outlet_index) = index_by_name(outlets, |o| &o.name);
        let (employees, employee_index) = index_by_name(employees, |e| &e.name);
        let (parties, party_index) = index_by_name(parties, |p| &p.name);
        Self {
            products,
            product_index,
            outlets,
            outlet_index,
            employees,
            employee_index,
            parties,
            party_index,
        }
    }

    /// Look up a product by exact name
    pub fn find_product(&self, name: &str) -> Option<&Product> {
        self.product_index.get(name).map(|&i| &self.products[i])
    }

    /// Look up an outlet by exact name
    pub fn find_outlet(&self, name: &str) -> Option<&Outlet> {
        self.outlet_index.get(name).map(|&i| &self.outlets[i])
    }

    /// Look up an employee by exact name
    pub fn find_employee(&self, name: &str) -> Option<&Employee> {
        self.employee_index.get(name).map(|&i| &self.employees[i])
    }

    /// Look up a party by exact name
    pub fn find_party(&self, name: &str) -> Option<&Party> {
        self.party_index.get(name).map(|&i| &self.parties[i])
    }

    /// Product names in table order, for selection lists
    pub fn product_names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    /// Outlet names in table order, for selection lists
    pub fn outlet_names(&self) -> Vec<&str> {
        self.outlets.iter().map(|o| o.name.as_str()).collect()
    }

    /// Party names in table order, for selection lists
    pub fn party_names(&self) -> Vec<&str> {
        self.parties.iter().map(|p| p.name.as_str()).collect()
    }

    /// Discounted unit price for a product under a discount category
    pub fn category_price(&self, product: &str, category: &str) -> Option<&BigDecimal> {
        self.find_product(product)?.category_prices.get(category)
    }

    /// Discount percentage implied by a category price
    ///
    /// Derived as `(unit price - category price) / unit price x 100`, so a
    /// 450.00 category price on a 500.00 product yields 10. Returns `None`
    /// when the product or category is unknown, or the unit price is zero.
    pub fn discount_percent_for(&self, product: &str, category: &str) -> Option<BigDecimal> {
        let product = self.find_product(product)?;
        let category_price = product.category_prices.get(category)?;
        if product.unit_price == BigDecimal::from(0) {
            return None;
        }
        let delta = &product.unit_price - category_price;
        Some((delta * BigDecimal::from(100)) / &product.unit_price)
    }
}

fn index_by_name<T>(rows: Vec<T>, name: impl Fn(&T) -> &str) -> (Vec<T>, HashMap<String, usize>) {
    let mut kept = Vec::with_capacity(rows.len());
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        let key = name(&row).to_string();
        if index.contains_key(&key) {
            continue;
        }
        index.insert(key, kept.len());
        kept.push(row);
    }
    (kept, index)
}

fn table_reader(path: &Path) -> CatalogResult<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn ensure_columns(
    headers: &csv::StringRecord,
    table: &'static str,
    required: &[&'static str],
) -> CatalogResult<()> {
    for &column in required {
        if !headers.iter().any(|header| header == column) {
            return Err(CatalogError::MissingColumn { table, column });
        }
    }
    Ok(())
}

/// Parse the products table
///
/// `Product Name` and `Price` are required; every other column is treated
/// as a discount category, with blank cells meaning the category does not
/// price that product.
fn load_products(path: &Path) -> CatalogResult<Vec<Product>> {
    let mut reader = table_reader(path)?;
    let headers = reader.headers()?.clone();
    ensure_columns(&headers, "products", &[PRODUCT_NAME_COLUMN, PRICE_COLUMN])?;

    let name_idx = headers
        .iter()
        .position(|h| h == PRODUCT_NAME_COLUMN)
        .unwrap_or_default();
    let price_idx = headers
        .iter()
        .position(|h| h == PRICE_COLUMN)
        .unwrap_or_default();

    let mut products = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(name_idx).unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }

        let raw_price = record.get(price_idx).unwrap_or("");
        let unit_price =
            BigDecimal::from_str(raw_price).map_err(|_| CatalogError::InvalidPrice {
                product: name.clone(),
                value: raw_price.to_string(),
            })?;

        let mut category_prices = HashMap::new();
        for (idx, category) in headers.iter().enumerate() {
            if idx == name_idx || idx == price_idx {
                continue;
            }
            let cell = record.get(idx).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            let price = BigDecimal::from_str(cell).map_err(|_| CatalogError::InvalidPrice {
                product: name.clone(),
                value: cell.to_string(),
            })?;
            category_prices.insert(category.to_string(), price);
        }

        products.push(Product {
            name,
            unit_price,
            category_prices,
        });
    }
    Ok(products)
}

#[derive(Debug, Deserialize)]
struct OutletRow {
    #[serde(rename = "Shop Name")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "GST")]
    gstin: String,
    #[serde(rename = "Contact")]
    contact: String,
}

fn load_outlets(path: &Path) -> CatalogResult<Vec<Outlet>> {
    let mut reader = table_reader(path)?;
    ensure_columns(
        reader.headers()?,
        "outlets",
        &["Shop Name", "Address", "GST", "Contact"],
    )?;
    let mut outlets = Vec::new();
    for row in reader.deserialize::<OutletRow>() {
        let row = row?;
        outlets.push(Outlet {
            name: row.name,
            address: row.address,
            gstin: row.gstin,
            contact: row.contact,
        });
    }
    Ok(outlets)
}

#[derive(Debug, Deserialize)]
struct EmployeeRow {
    #[serde(rename = "Employee Name")]
    name: String,
    #[serde(rename = "Discount Category")]
    discount_category: String,
}

fn load_employees(path: &Path) -> CatalogResult<Vec<Employee>> {
    let mut reader = table_reader(path)?;
    ensure_columns(
        reader.headers()?,
        "persons",
        &["Employee Name", "Discount Category"],
    )?;
    let mut employees = Vec::new();
    for row in reader.deserialize::<EmployeeRow>() {
        let row = row?;
        employees.push(Employee {
            name: row.name,
            discount_category: row.discount_category,
        });
    }
    Ok(employees)
}

#[derive(Debug, Deserialize)]
struct PartyRow {
    #[serde(rename = "Party")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "GSTIN/UN")]
    gstin: String,
}

fn load_parties(path: &Path) -> CatalogResult<Vec<Party>> {
    let mut reader = table_reader(path)?;
    ensure_columns(reader.headers()?, "parties", &["Party", "Address", "GSTIN/UN"])?;
    let mut parties = Vec::new();
    for row in reader.deserialize::<PartyRow>() {
        let row = row?;
        parties.push(Party {
            name: row.name,
            address: row.address,
            gstin: row.gstin,
        });
    }
    Ok(parties)
}
