//! Domain constants
//!
//! Confirmation tokens guard destructive endpoints: the request body must
//! carry the literal token or the operation is rejected before any cache or
//! network effect.

/// Confirmation token for single destructive deletes.
pub const CONFIRM_DELETE: &str = "DELETE";

/// Confirmation token for bulk deletes.
pub const CONFIRM_BULK_DELETE: &str = "BULK_DELETE";

/// Confirmation token for bulk restores.
pub const CONFIRM_BULK_RESTORE: &str = "BULK_RESTORE";

/// Confirmation token for emptying the estimate trash.
pub const CONFIRM_EMPTY_TRASH: &str = "EMPTY_TRASH";

/// Confirmation token for delete-all operations.
pub const CONFIRM_DELETE_ALL: &str = "DELETE_ALL";

/// Allowed shape of any path segment taken from user input.
///
/// Alphanumeric and hyphen only; anything else fails closed before an
/// outbound request is made.
pub const SAFE_ID_PATTERN: &str = "^[a-zA-Z0-9-]+$";

/// Days a trashed estimate remains restorable before permanent deletion.
pub const TRASH_RETENTION_DAYS: u32 = 30;

/// Marker header attached to backend requests outside production.
pub const DEV_MARKER_HEADER: &str = "X-CheapAlarms-Dev";

/// Error body `code` value the backend uses to signal rate limiting.
pub const RATE_LIMITED_CODE: &str = "rate_limited";
