//! Authenticated-actor identity
//!
//! The auth/session collaborator verifies credentials and hands the engine
//! an [`AuthenticatedActor`]; the engine trusts this identity without
//! re-verifying it.

use super::wallet::UserId;
use serde::{Deserialize, Serialize};

/// Role carried by an authenticated session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular buyer account
    Customer,

    /// Merchant account that may list products
    Merchant,
}

/// Verified identity of the user making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedActor {
    /// The user's id
    pub id: UserId,

    /// The user's role
    pub role: Role,
}
