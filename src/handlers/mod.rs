// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (bearer token) → Elevated (admin)
//
// Protected and elevated routes share one middleware stack: the bearer token is
// verified, the caller is resolved, and the role policy guards route prefixes. The
// elevated tier is grouped separately because every handler in it is admin-only.
pub mod elevated; // Tier 3: admin (/admin/*, prompt template management)
pub mod protected; // Tier 2: any authenticated caller, scoped by role in services
pub mod public; // Tier 1: no authentication required

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path id, rejecting malformed values before any lookup.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}
