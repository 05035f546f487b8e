/// Default page size for paginated transaction listings
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// MONEY
// =============================================================================

/// Fractional digits carried by every amount
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Total significant digits allowed in a transaction amount, NUMERIC(10, 2)
pub const AMOUNT_MAX_DIGITS: u32 = 10;

// =============================================================================
// CATEGORIES
// =============================================================================

pub const CATEGORY_NAME_MAX_LENGTH: u64 = 100;

pub const DUPLICATE_CATEGORY_MESSAGE: &str = "You already have a category with this name.";

pub const FOREIGN_CATEGORY_MESSAGE: &str = "Cannot use a category you don't own.";

// =============================================================================
// REPORTS
// =============================================================================

/// Number of transactions listed in a summary email
pub const REPORT_RECENT_TRANSACTIONS: i64 = 5;
