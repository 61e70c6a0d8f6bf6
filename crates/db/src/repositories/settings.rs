//! Settings repository: one lazily-created configuration row per company.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use faktura_shared::types::Currency;

use crate::entities::{companies, settings};

/// Error types for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The acting company does not exist.
    #[error("Company not found: {0}")]
    CompanyNotFound(Uuid),

    /// Unknown currency code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Tax rate outside 0..=100.
    #[error("Default tax rate {0} must be between 0 and 100")]
    InvalidTaxRate(Decimal),

    /// Update contained no fields.
    #[error("No fields provided for update")]
    EmptyUpdate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating settings (merge-patch).
#[derive(Debug, Clone, Default)]
pub struct UpdateSettingsInput {
    /// Display name used on documents.
    pub company_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone (`Some(None)` clears it).
    pub phone: Option<Option<String>>,
    /// Postal address (`Some(None)` clears it).
    pub address: Option<Option<String>>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Default percentage tax rate for new invoices.
    pub default_tax_rate: Option<Decimal>,
    /// Logo URL (`Some(None)` clears it).
    pub logo_url: Option<Option<String>>,
}

impl UpdateSettingsInput {
    fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.currency.is_none()
            && self.default_tax_rate.is_none()
            && self.logo_url.is_none()
    }
}

/// Settings repository.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    /// Creates a new settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the company's settings row, creating it with defaults on
    /// first read.
    ///
    /// Defaults: the company's own name and contact fields, USD, zero tax.
    /// The unique constraint on `company_id` makes concurrent first reads
    /// idempotent: the loser of the insert race re-reads the winner's row.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::CompanyNotFound` if the company is absent.
    pub async fn get_or_create(&self, company_id: Uuid) -> Result<settings::Model, SettingsError> {
        if let Some(existing) = self.find_by_company(company_id).await? {
            return Ok(existing);
        }

        let company = companies::Entity::find_by_id(company_id)
            .one(&self.db)
            .await?
            .ok_or(SettingsError::CompanyNotFound(company_id))?;

        let now = chrono::Utc::now().into();
        let row = settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            company_name: Set(company.name),
            email: Set(company.email),
            phone: Set(company.phone),
            address: Set(company.address),
            currency: Set(Currency::default().to_string()),
            default_tax_rate: Set(Decimal::ZERO),
            logo_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match row.insert(&self.db).await {
            Ok(created) => Ok(created),
            // Lost the first-read race: another request created the row
            // between our lookup and insert. Return the winner's row.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .find_by_company(company_id)
                .await?
                .ok_or(SettingsError::Database(e)),
            Err(e) => Err(e.into()),
        }
    }

    /// Updates settings with a merge-patch of the provided fields.
    ///
    /// Operates on the lazily-created row, so updating before the first
    /// read works too.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the company is absent.
    pub async fn update_settings(
        &self,
        company_id: Uuid,
        input: UpdateSettingsInput,
    ) -> Result<settings::Model, SettingsError> {
        if input.is_empty() {
            return Err(SettingsError::EmptyUpdate);
        }

        if let Some(ref code) = input.currency {
            code.parse::<Currency>()
                .map_err(|_| SettingsError::InvalidCurrency(code.clone()))?;
        }
        if let Some(rate) = input.default_tax_rate
            && (rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED)
        {
            return Err(SettingsError::InvalidTaxRate(rate));
        }

        let current = self.get_or_create(company_id).await?;
        let mut active: settings::ActiveModel = current.into();

        if let Some(company_name) = input.company_name {
            active.company_name = Set(company_name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency.to_uppercase());
        }
        if let Some(rate) = input.default_tax_rate {
            active.default_tax_rate = Set(rate);
        }
        if let Some(logo_url) = input.logo_url {
            active.logo_url = Set(logo_url);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    async fn find_by_company(
        &self,
        company_id: Uuid,
    ) -> Result<Option<settings::Model>, SettingsError> {
        let row = settings::Entity::find()
            .filter(settings::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;
        Ok(row)
    }
}
