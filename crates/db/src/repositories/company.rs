//! Company repository: the tenant directory, operated by super-admins.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use faktura_shared::types::PageRequest;

use crate::entities::{clients, companies, invoices, sea_orm_active_enums::UserRole, settings, users};

/// Error types for tenant-directory operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// Company not found.
    #[error("Company not found: {0}")]
    NotFound(Uuid),

    /// Company name is empty or too long.
    #[error("Name must be between 1 and 255 characters")]
    InvalidName,

    /// A user with the owner email already exists.
    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),

    /// Company still owns business records and cannot be deleted.
    #[error("Company has dependent records: {clients} clients, {invoices} invoices")]
    HasChildRecords {
        /// Number of clients still owned.
        clients: u64,
        /// Number of invoices still owned.
        invoices: u64,
    },

    /// Update contained no fields.
    #[error("No fields provided for update")]
    EmptyUpdate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for provisioning a company with its first staff user.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Company name.
    pub name: String,
    /// Company contact email.
    pub email: String,
    /// Company contact phone.
    pub phone: Option<String>,
    /// Company postal address.
    pub address: Option<String>,
    /// Email of the first staff user.
    pub owner_email: String,
    /// Argon2id hash of the first staff user's password.
    pub owner_password_hash: String,
    /// Full name of the first staff user.
    pub owner_full_name: String,
}

/// Input for updating a company (merge-patch).
#[derive(Debug, Clone, Default)]
pub struct UpdateCompanyInput {
    /// Company name.
    pub name: Option<String>,
    /// Company contact email.
    pub email: Option<String>,
    /// Company contact phone (`Some(None)` clears it).
    pub phone: Option<Option<String>>,
    /// Company postal address (`Some(None)` clears it).
    pub address: Option<Option<String>>,
    /// Active flag.
    pub is_active: Option<bool>,
}

impl UpdateCompanyInput {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.is_active.is_none()
    }
}

fn validate_name(name: &str) -> Result<(), CompanyError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 255 {
        return Err(CompanyError::InvalidName);
    }
    Ok(())
}

/// Company repository for tenant-directory operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all companies, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_companies(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<companies::Model>, u64), CompanyError> {
        let query = companies::Entity::find();

        let total = query.clone().count(&self.db).await?;

        let data = query
            .order_by_desc(companies::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<companies::Model>, CompanyError> {
        let company = companies::Entity::find_by_id(id).one(&self.db).await?;
        Ok(company)
    }

    /// Provisions a new company together with its first staff user.
    ///
    /// Both rows are inserted in one transaction so a crash cannot leave a
    /// tenant without a login.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::DuplicateEmail` if the owner email is taken.
    pub async fn create_with_owner(
        &self,
        input: CreateCompanyInput,
    ) -> Result<(companies::Model, users::Model), CompanyError> {
        validate_name(&input.name)?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&input.owner_email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CompanyError::DuplicateEmail(input.owner_email));
        }

        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let company_id = Uuid::new_v4();

        let company = companies::ActiveModel {
            id: Set(company_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let company = company.insert(&txn).await?;

        let owner = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(Some(company_id)),
            email: Set(input.owner_email),
            password_hash: Set(input.owner_password_hash),
            full_name: Set(input.owner_full_name),
            role: Set(UserRole::Staff),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let owner = owner.insert(&txn).await?;

        txn.commit().await?;

        Ok((company, owner))
    }

    /// Updates a company with a merge-patch of the provided fields.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::NotFound` if the company does not exist.
    pub async fn update_company(
        &self,
        id: Uuid,
        input: UpdateCompanyInput,
    ) -> Result<companies::Model, CompanyError> {
        if input.is_empty() {
            return Err(CompanyError::EmptyUpdate);
        }

        let company = self
            .find_by_id(id)
            .await?
            .ok_or(CompanyError::NotFound(id))?;

        let mut active: companies::ActiveModel = company.into();

        if let Some(name) = input.name {
            validate_name(&name)?;
            active.name = Set(name);
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
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let company = active.update(&self.db).await?;
        Ok(company)
    }

    /// Deletes a company.
    ///
    /// Refused while the company still owns clients or invoices. The
    /// settings row and staff users are configuration rather than business
    /// records; they are removed together with the company in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::HasChildRecords` while business records exist.
    pub async fn delete_company(&self, id: Uuid) -> Result<(), CompanyError> {
        let company = self
            .find_by_id(id)
            .await?
            .ok_or(CompanyError::NotFound(id))?;

        let client_count = clients::Entity::find()
            .filter(clients::Column::CompanyId.eq(id))
            .count(&self.db)
            .await?;
        let invoice_count = invoices::Entity::find()
            .filter(invoices::Column::CompanyId.eq(id))
            .count(&self.db)
            .await?;

        if client_count > 0 || invoice_count > 0 {
            return Err(CompanyError::HasChildRecords {
                clients: client_count,
                invoices: invoice_count,
            });
        }

        let txn = self.db.begin().await?;

        settings::Entity::delete_many()
            .filter(settings::Column::CompanyId.eq(id))
            .exec(&txn)
            .await?;
        users::Entity::delete_many()
            .filter(users::Column::CompanyId.eq(id))
            .exec(&txn)
            .await?;
        companies::Entity::delete_by_id(company.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
