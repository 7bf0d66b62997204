//! # Seed Data Generator
//!
//! Populates an empty database with demo accounts and master data.
//!
//! ## Usage
//! ```bash
//! # Seed ./kestrel.db (default)
//! cargo run -p kestrel-db --bin seed
//!
//! # Specify database path
//! cargo run -p kestrel-db --bin seed -- --db ./data/kestrel.db
//! ```
//!
//! ## Generated Data
//! - One account per role (admin, sales, purchase, inventory)
//! - Three products, two customers, two suppliers
//! - A sample purchase order with a full goods receipt, and a sample
//!   sales order with a paid invoice
//!
//! The sample documents go through the real workflows, so stock reflects
//! them: the laptop ends at 25 + 20 received − 2 sold = 43.

use chrono::{Duration, Utc};
use kestrel_core::{
    Address, GrnStatus, InvoiceStatus, NewCustomer, NewGrn, NewInvoice, NewProduct,
    NewPurchaseOrder, NewPurchaseOrderItem, NewSalesOrder, NewSalesOrderItem, NewSupplier,
    NewUser, PaymentMethod, PaymentStatus, ReceiptLine, Role, SalesOrderStatus,
    SalesOrderStatusUpdate,
};
use kestrel_db::{Database, DbConfig};
use std::env;

/// (name, email, password, role)
const USERS: &[(&str, &str, &str, Role)] = &[
    ("Ritesh", "admin@erp.com", "Admin@123", Role::Admin),
    ("Amit Sharma", "sales@erp.com", "Sales@123", Role::Sales),
    ("Neha Patil", "purchase@erp.com", "Purchase@123", Role::Purchase),
    ("Rahul Verma", "inventory@erp.com", "Inventory@123", Role::Inventory),
];

/// (title, sku, price, cost, stock, reorder level)
const PRODUCTS: &[(&str, &str, f64, f64, i64, i64)] = &[
    ("HP Pavilion Laptop", "HP-LAP-001", 62000.0, 58000.0, 25, 5),
    ("Wireless Mouse", "MOU-002", 1200.0, 800.0, 150, 20),
    ("Mechanical Keyboard", "KEY-003", 4500.0, 3200.0, 60, 10),
];

/// (name, email, phone, street, city, state)
const CUSTOMERS: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("TechNova Pvt Ltd", "contact@technova.com", "9876543210", "Baner Road", "Pune", "Maharashtra"),
    ("Digital World", "sales@digitalworld.com", "9123456780", "Andheri West", "Mumbai", "Maharashtra"),
];

const SUPPLIERS: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("Global IT Suppliers", "orders@globalit.com", "9988776655", "MG Road", "Bangalore", "Karnataka"),
    ("Smart Electronics", "info@smartelectronics.in", "8899776655", "Nehru Place", "Delhi", "Delhi"),
];

fn address(street: &str, city: &str, state: &str) -> Address {
    Address {
        street: Some(street.to_string()),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        zip_code: None,
        country: Some("India".to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./kestrel.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kestrel ERP Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kestrel.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kestrel ERP Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.users().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} users", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // 1. Users
    let mut admin_id = None;
    for (name, email, password, role) in USERS {
        let user = db
            .users()
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: Some(*role),
            })
            .await?;
        if *role == Role::Admin {
            admin_id = Some(user.id);
        }
    }
    let admin = admin_id.as_deref();
    println!("✓ {} users", USERS.len());

    // 2. Products
    let mut product_ids = Vec::new();
    for (title, sku, price, cost, stock, reorder_level) in PRODUCTS {
        let product = db
            .products()
            .create(
                NewProduct {
                    title: title.to_string(),
                    sku: sku.to_string(),
                    category: "Electronics".to_string(),
                    unit: Some("pcs".to_string()),
                    price: *price,
                    cost: Some(*cost),
                    stock: Some(*stock),
                    reorder_level: Some(*reorder_level),
                    ..Default::default()
                },
                admin,
            )
            .await?;
        product_ids.push(product.id);
    }
    println!("✓ {} products", PRODUCTS.len());

    // 3. Customers & suppliers
    let mut customer_ids = Vec::new();
    for (name, email, phone, street, city, state) in CUSTOMERS {
        let customer = db
            .customers()
            .create(
                NewCustomer {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                    company: Some(name.to_string()),
                    address: address(street, city, state),
                    ..Default::default()
                },
                admin,
            )
            .await?;
        customer_ids.push(customer.id);
    }

    let mut supplier_ids = Vec::new();
    for (name, email, phone, street, city, state) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(
                NewSupplier {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                    company: Some(name.to_string()),
                    address: address(street, city, state),
                    ..Default::default()
                },
                admin,
            )
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} customers, {} suppliers", customer_ids.len(), supplier_ids.len());

    // 4. Sample purchase order, fully received
    let laptop = product_ids[0].clone();
    let po = db
        .purchasing()
        .create_purchase_order(
            NewPurchaseOrder {
                supplier_id: supplier_ids[0].clone(),
                items: vec![NewPurchaseOrderItem {
                    product_id: laptop.clone(),
                    quantity: 20,
                    price: 58000.0,
                    total: None,
                }],
                ..Default::default()
            },
            admin,
        )
        .await?;

    let (grn, po) = db
        .purchasing()
        .record_goods_receipt(
            NewGrn {
                purchase_order_id: po.id.clone(),
                items: vec![ReceiptLine {
                    product_id: laptop.clone(),
                    ordered_quantity: None,
                    received_quantity: 20,
                    rejected_quantity: 0,
                    remarks: Some("Received in good condition".to_string()),
                }],
                status: Some(GrnStatus::Completed),
                ..Default::default()
            },
            admin,
        )
        .await?;
    println!("✓ {} → {} ({:?})", po.order_number, grn.grn_number, po.status);

    // 5. Sample sales order with a paid invoice
    let so = db
        .sales()
        .create_sales_order(
            NewSalesOrder {
                customer_id: customer_ids[0].clone(),
                items: vec![NewSalesOrderItem {
                    product_id: laptop.clone(),
                    quantity: 2,
                    price: 62000.0,
                    discount: 0.0,
                    total: None,
                }],
                status: Some(SalesOrderStatus::Confirmed),
                ..Default::default()
            },
            admin,
        )
        .await?;

    let invoice = db
        .sales()
        .create_invoice(
            NewInvoice {
                sales_order_id: so.id.clone(),
                status: Some(InvoiceStatus::Paid),
                paid_amount: Some(so.total_price),
                payment_method: Some(PaymentMethod::BankTransfer),
                due_date: Utc::now() + Duration::days(7),
                ..Default::default()
            },
            admin,
        )
        .await?;

    // Invoicing resets the order to unpaid; the sample invoice is settled.
    db.sales_orders()
        .update_status(
            &so.id,
            SalesOrderStatusUpdate {
                status: None,
                payment_status: Some(PaymentStatus::Paid),
            },
        )
        .await?;
    println!("✓ {} → {}", so.order_number, invoice.invoice_number);

    let stock = db.products().find_by_id(&laptop).await?.stock;
    println!();
    println!("  Laptop stock after samples: {}", stock);
    println!();
    println!("✓ Seed complete!");
    println!("  Log in as admin@erp.com / Admin@123");

    Ok(())
}
