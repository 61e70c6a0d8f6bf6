//! Row-Level Security (RLS) context management.
//!
//! Application-level scoping in the repositories is the primary tenant
//! isolation mechanism; the `PostgreSQL` RLS policies keyed on the
//! `app.current_company_id` session variable are a second, independent
//! layer for connections made as the restricted `faktura_app` role.

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use uuid::Uuid;

/// A database connection wrapper that sets RLS context for multi-tenant isolation.
///
/// Wraps a transaction and sets `app.current_company_id` with `SET LOCAL`
/// before any queries execute, so the policies see the acting tenant.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Creates a new RLS-enabled connection with the given company context.
    ///
    /// Begins a transaction and sets `app.current_company_id` using
    /// `SET LOCAL`, which scopes the setting to the transaction only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(db: &DatabaseConnection, company_id: Uuid) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        // company_id is a Uuid, so interpolation cannot inject SQL
        let sql = format!("SET LOCAL app.current_company_id = '{company_id}'");
        txn.execute_unprepared(&sql).await?;

        Ok(Self { txn })
    }

    /// Returns a reference to the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to easily create RLS-enabled connections.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Creates an RLS-enabled connection with the given company context.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_rls(&self, company_id: Uuid) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_rls(&self, company_id: Uuid) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, company_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rls_sql_format() {
        let company_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let sql = format!("SET LOCAL app.current_company_id = '{company_id}'");
        assert_eq!(
            sql,
            "SET LOCAL app.current_company_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
