//! Client repository for per-company customer records.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use faktura_shared::types::PageRequest;

use crate::entities::clients;

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client not found in the acting company.
    #[error("Client not found: {0}")]
    NotFound(Uuid),

    /// Client name is empty or too long.
    #[error("Name must be between 1 and 255 characters")]
    InvalidName,

    /// Email is not plausibly an email address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Update contained no fields.
    #[error("No fields provided for update")]
    EmptyUpdate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClientInput {
    /// Owning company.
    pub company_id: Uuid,
    /// Client name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Input for updating a client (merge-patch).
#[derive(Debug, Clone, Default)]
pub struct UpdateClientInput {
    /// Client name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone (`Some(None)` clears it).
    pub phone: Option<Option<String>>,
    /// Postal address (`Some(None)` clears it).
    pub address: Option<Option<String>>,
}

impl UpdateClientInput {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

fn validate_name(name: &str) -> Result<(), ClientError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 255 {
        return Err(ClientError::InvalidName);
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ClientError> {
    if !email.contains('@') || email.len() > 255 {
        return Err(ClientError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new client for a company.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the insert fails.
    pub async fn create_client(
        &self,
        input: CreateClientInput,
    ) -> Result<clients::Model, ClientError> {
        validate_name(&input.name)?;
        validate_email(&input.email)?;

        let now = chrono::Utc::now().into();
        let client = clients::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(input.company_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let client = client.insert(&self.db).await?;
        Ok(client)
    }

    /// Lists a company's clients, ordered by name.
    ///
    /// The company filter is unconditional: a tenant can never see another
    /// tenant's clients through this method.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_clients(
        &self,
        company_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<clients::Model>, u64), ClientError> {
        let query = clients::Entity::find().filter(clients::Column::CompanyId.eq(company_id));

        let total = query.clone().count(&self.db).await?;

        let data = query
            .order_by_asc(clients::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Finds a client by ID within the acting company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_client(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<clients::Model>, ClientError> {
        let client = clients::Entity::find_by_id(id)
            .filter(clients::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;
        Ok(client)
    }

    /// Updates a client with a merge-patch of the provided fields.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for absent or cross-tenant clients.
    pub async fn update_client(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateClientInput,
    ) -> Result<clients::Model, ClientError> {
        if input.is_empty() {
            return Err(ClientError::EmptyUpdate);
        }

        let client = self
            .find_client(company_id, id)
            .await?
            .ok_or(ClientError::NotFound(id))?;

        let mut active: clients::ActiveModel = client.into();

        if let Some(name) = input.name {
            validate_name(&name)?;
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            validate_email(&email)?;
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let client = active.update(&self.db).await?;
        Ok(client)
    }

    /// Deletes a client.
    ///
    /// Deletion is unconditional: invoices referencing the client are not
    /// checked. Matches the historical behavior of the product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for absent or cross-tenant clients.
    pub async fn delete_client(&self, company_id: Uuid, id: Uuid) -> Result<(), ClientError> {
        let client = self
            .find_client(company_id, id)
            .await?
            .ok_or(ClientError::NotFound(id))?;

        clients::Entity::delete_by_id(client.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
