//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Every method that touches tenant-owned data takes the acting company ID
//! and filters by it; cross-tenant access surfaces as not-found.

pub mod client;
pub mod company;
pub mod dashboard;
pub mod invoice;
pub mod payment;
pub mod settings;
pub mod user;

pub use client::{ClientError, ClientRepository, CreateClientInput, UpdateClientInput};
pub use company::{CompanyError, CompanyRepository, CreateCompanyInput, UpdateCompanyInput};
pub use dashboard::{DashboardError, DashboardRepository, DashboardStats, RecentTransaction};
pub use invoice::{
    CreateInvoiceInput, InvoiceDocument, InvoiceError, InvoiceFilter, InvoiceRepository,
    UpdateInvoiceInput,
};
pub use payment::{PaymentError, PaymentRepository, RecordPaymentInput};
pub use settings::{SettingsError, SettingsRepository, UpdateSettingsInput};
pub use user::{CreateUserInput, UserRepository};
