//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum display name length requirement
pub const MIN_DISPLAY_NAME_LENGTH: usize = 1;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier carried by a user that has not been persisted yet
pub const UNASSIGNED_ID: u64 = 0;
