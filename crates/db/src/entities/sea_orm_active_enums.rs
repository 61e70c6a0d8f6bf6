//! Database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice lifecycle status as stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Invoice drafted but not issued.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Invoice issued to the client.
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Invoice settled in full.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Legacy stored status; the application derives overdue at read time.
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular company staff, scoped to one company.
    #[sea_orm(string_value = "staff")]
    Staff,
    /// Operates the tenant directory; exempt from company scoping.
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

impl From<InvoiceStatus> for faktura_core::billing::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Overdue => Self::Overdue,
        }
    }
}

impl From<faktura_core::billing::InvoiceStatus> for InvoiceStatus {
    fn from(status: faktura_core::billing::InvoiceStatus) -> Self {
        match status {
            faktura_core::billing::InvoiceStatus::Draft => Self::Draft,
            faktura_core::billing::InvoiceStatus::Sent => Self::Sent,
            faktura_core::billing::InvoiceStatus::Paid => Self::Paid,
            faktura_core::billing::InvoiceStatus::Overdue => Self::Overdue,
        }
    }
}
