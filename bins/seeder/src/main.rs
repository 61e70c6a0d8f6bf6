//! Database seeder for Faktura development and testing.
//!
//! Seeds a demo company with a super-admin, staff user, clients, invoices,
//! and payments for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use faktura_core::auth::hash_password;
use faktura_core::billing::LineItemInput;
use faktura_db::repositories::{
    client::CreateClientInput,
    company::CreateCompanyInput,
    invoice::CreateInvoiceInput,
    payment::RecordPaymentInput,
    user::CreateUserInput,
};
use faktura_db::{
    ClientRepository, CompanyRepository, InvoiceRepository, PaymentRepository,
    entities::sea_orm_active_enums::UserRole,
};

const ADMIN_EMAIL: &str = "admin@faktura.dev";
const OWNER_EMAIL: &str = "owner@demo.faktura.dev";
const DEMO_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = faktura_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding super-admin...");
    seed_super_admin(&db).await;

    println!("Seeding demo company...");
    let company_id = seed_demo_company(&db).await;

    println!("Seeding clients and invoices...");
    seed_invoicing_data(&db, company_id).await;

    println!("Seeding complete!");
    println!("  super-admin: {ADMIN_EMAIL} / {DEMO_PASSWORD}");
    println!("  demo staff:  {OWNER_EMAIL} / {DEMO_PASSWORD}");
}

async fn seed_super_admin(db: &DatabaseConnection) {
    let repo = faktura_db::UserRepository::new(db.clone());

    if repo
        .find_by_email(ADMIN_EMAIL)
        .await
        .expect("Failed to query users")
        .is_some()
    {
        println!("  super-admin already exists, skipping");
        return;
    }

    repo.create(CreateUserInput {
        company_id: None,
        email: ADMIN_EMAIL.to_string(),
        password_hash: hash_password(DEMO_PASSWORD).expect("Failed to hash password"),
        full_name: "Platform Admin".to_string(),
        role: UserRole::SuperAdmin,
    })
    .await
    .expect("Failed to create super-admin");
}

async fn seed_demo_company(db: &DatabaseConnection) -> Uuid {
    let user_repo = faktura_db::UserRepository::new(db.clone());

    if let Some(owner) = user_repo
        .find_by_email(OWNER_EMAIL)
        .await
        .expect("Failed to query users")
    {
        println!("  demo company already exists, skipping");
        return owner.company_id.expect("Demo owner should have a company");
    }

    let repo = CompanyRepository::new(db.clone());
    let (company, _owner) = repo
        .create_with_owner(CreateCompanyInput {
            name: "Demo Studio".to_string(),
            email: "studio@demo.faktura.dev".to_string(),
            phone: Some("+1 555 0199".to_string()),
            address: Some("42 Demo Lane, Springfield".to_string()),
            owner_email: OWNER_EMAIL.to_string(),
            owner_password_hash: hash_password(DEMO_PASSWORD).expect("Failed to hash password"),
            owner_full_name: "Demo Owner".to_string(),
        })
        .await
        .expect("Failed to create demo company");

    company.id
}

async fn seed_invoicing_data(db: &DatabaseConnection, company_id: Uuid) {
    let client_repo = ClientRepository::new(db.clone());
    let invoice_repo = InvoiceRepository::new(db.clone());
    let payment_repo = PaymentRepository::new(db.clone());

    let clients = [
        ("Acme Corp", "billing@acme.example"),
        ("Globex", "ap@globex.example"),
        ("Initech", "accounts@initech.example"),
    ];

    let mut client_ids = Vec::new();
    for (name, email) in clients {
        let client = client_repo
            .create_client(CreateClientInput {
                company_id,
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
                address: None,
            })
            .await
            .expect("Failed to create client");
        client_ids.push(client.id);
    }

    // One unpaid, one partially paid, one fully paid
    let plans: [(&str, Decimal, Option<Decimal>); 3] = [
        ("Website redesign", dec!(1200), None),
        ("Monthly retainer", dec!(800), Some(dec!(300))),
        ("Logo package", dec!(450), Some(dec!(495))),
    ];

    for (i, (description, rate, payment)) in plans.into_iter().enumerate() {
        let (invoice, _) = invoice_repo
            .create_invoice(CreateInvoiceInput {
                company_id,
                client_id: client_ids[i % client_ids.len()],
                number: None,
                tax_rate: dec!(10),
                due_date: Utc::now().date_naive() + Duration::days(14 * (i as i64 + 1)),
                items: vec![LineItemInput {
                    description: description.to_string(),
                    quantity: Decimal::ONE,
                    rate,
                }],
                subtotal: None,
                tax_amount: None,
                total: None,
            })
            .await
            .expect("Failed to create invoice");

        if let Some(amount) = payment {
            payment_repo
                .record_payment(
                    company_id,
                    RecordPaymentInput {
                        invoice_id: invoice.id,
                        amount,
                        payment_date: None,
                        notes: Some("Seeded payment".to_string()),
                    },
                )
                .await
                .expect("Failed to record payment");
        }
    }
}
