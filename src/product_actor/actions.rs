use crate::domain::CategoryId;

/// Custom actions for Product entities.
///
/// Each action is handled inside the product actor, so a stock check and the
/// mutation that follows it cannot interleave with another request.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Advisory check: is there at least this much stock right now?
    CheckAvailable(u32),
    /// Reads the current stock level without modifying it.
    StockLevel,
    /// Authoritative decrement.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if stock is below the amount at the
    /// moment the action runs.
    Debit(u32),
    /// Manual restock by an administrator.
    Credit(u32),
    /// Refreshes the cached category name if the product belongs to it.
    RenameCategory { category_id: CategoryId, name: String },
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductActionResult {
    CheckAvailable(bool),
    StockLevel(u32),
    Debit { remaining: u32 },
    Credit { stock: u32 },
    RenameCategory { renamed: bool },
}
