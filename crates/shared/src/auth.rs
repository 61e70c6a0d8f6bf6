//! Authentication types for JWT identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
///
/// `company` is the tenant the identity is scoped to. Super-admin tokens
/// carry no company and are only valid on the tenant-directory surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Company ID the identity is scoped to (absent for super-admins).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Uuid>,
    /// User's role (`staff` or `super_admin`).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        company_id: Option<Uuid>,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            company: company_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the company ID from claims, if the identity is company-scoped.
    #[must_use]
    pub const fn company_id(&self) -> Option<Uuid> {
        self.company
    }

    /// Returns true if the claims carry the super-admin role.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == "super_admin"
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Authenticated user info returned with the token.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User full name.
    pub full_name: String,
    /// User role.
    pub role: String,
    /// Company the user belongs to (absent for super-admins).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Bearer access token.
    pub access_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
    /// Authenticated user info.
    pub user: UserInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_company_scoped() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            Some(company_id),
            "staff",
            Utc::now() + chrono::Duration::hours(1),
        );

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.company_id(), Some(company_id));
        assert!(!claims.is_super_admin());
    }

    #[test]
    fn test_claims_super_admin_has_no_company() {
        let claims = Claims::new(
            Uuid::new_v4(),
            None,
            "super_admin",
            Utc::now() + chrono::Duration::hours(1),
        );

        assert_eq!(claims.company_id(), None);
        assert!(claims.is_super_admin());
    }

    #[test]
    fn test_claims_serde_omits_missing_company() {
        let claims = Claims::new(
            Uuid::new_v4(),
            None,
            "super_admin",
            Utc::now() + chrono::Duration::hours(1),
        );

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("company").is_none());
    }
}
