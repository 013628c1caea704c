//! Actor model - dashboard operators and their fixed roles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Operator role. Assigned at signup and changed only through the admin
/// user-management endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ManagingDirector,
    SalesOfficer,
    Storekeeper,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ManagingDirector => "managing_director",
            Role::SalesOfficer => "sales_officer",
            Role::Storekeeper => "storekeeper",
        }
    }

    /// Parse a stored role code. Unknown codes yield `None`, which the
    /// permission layer treats as an empty permission set.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "managing_director" => Some(Role::ManagingDirector),
            "sales_officer" => Some(Role::SalesOfficer),
            "storekeeper" => Some(Role::Storekeeper),
            _ => None,
        }
    }

    /// Static permission tokens granted to this role.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => &["all"],
            Role::ManagingDirector => &["view_all_invoices", "view_reports", "manage_users"],
            Role::SalesOfficer => &["create_invoice", "view_own_invoices", "edit_own_invoices"],
            Role::Storekeeper => &["view_invoices", "update_inventory"],
        }
    }
}

/// Actor entity as stored in the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct Actor {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role_code: String,
    pub is_active: bool,
    pub password_hash: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Actor {
    /// Parsed role, `None` when the stored code is unknown.
    pub fn role(&self) -> Option<Role> {
        Role::from_string(&self.role_code)
    }

    /// Convert to sanitized response (no password hash).
    pub fn sanitized(&self) -> ActorResponse {
        ActorResponse::from(self.clone())
    }
}

/// Input for creating an actor.
#[derive(Debug, Clone)]
pub struct CreateActor {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    pub password_hash: String,
}

/// Input for updating an actor (admin only).
#[derive(Debug, Clone, Default)]
pub struct UpdateActor {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

/// Actor joined with invoice statistics, as returned by the user listing.
#[derive(Debug, Clone, FromRow)]
pub struct ActorWithStats {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role_code: String,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
    pub invoice_count: i64,
    pub total_revenue: Decimal,
}

/// Actor response for the API (without sensitive fields).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Actor> for ActorResponse {
    fn from(a: Actor) -> Self {
        Self {
            id: a.user_id,
            email: a.email,
            name: a.display_name,
            role: a.role_code,
            is_active: a.is_active,
            created_at: a.created_utc,
            updated_at: a.updated_utc,
        }
    }
}

/// User-management listing entry with per-actor invoice statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorWithStatsResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub invoice_count: i64,
    pub total_revenue: Decimal,
}

impl From<ActorWithStats> for ActorWithStatsResponse {
    fn from(a: ActorWithStats) -> Self {
        Self {
            id: a.user_id,
            email: a.email,
            name: a.display_name,
            role: a.role_code,
            is_active: a.is_active,
            created_at: a.created_utc,
            updated_at: a.updated_utc,
            invoice_count: a.invoice_count,
            total_revenue: a.total_revenue,
        }
    }
}
