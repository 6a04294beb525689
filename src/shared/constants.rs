/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Mount point of the concern routes
pub const CONCERNS_BASE_PATH: &str = "/api/concerns";

/// Request body limit on the concern routes. Large enough for the longest
/// accepted document in 4-byte UTF-8 after form encoding.
pub const CONCERN_BODY_LIMIT: usize = 32 * 1024 * 1024;

// =============================================================================
// ROLE & PERMISSION CONSTANTS
// =============================================================================

/// Super admin role - holds every permission
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Permission to list, inspect and resolve reported concerns
pub const PERMISSION_CHANGE_CONCERNS: &str = "concerns:change";
