//! The API endpoint URIs.

/// The route for recording a new expense.
pub const EXPENSES: &str = "/expenses";
/// The route for listing a month's expenses, one page at a time.
pub const EXPENSES_LIST: &str = "/expenses-list";
/// The route for the amount paid by each payer in a month.
pub const EXPENSES_TOTAL: &str = "/expenses-total";
/// The route for each payer's signed balance in a month.
pub const OUTSTANDING_BALANCE: &str = "/outstanding-balance";
/// The route for the full monthly balance summary, including who owes whom.
pub const BALANCE_SUMMARY: &str = "/balance-summary";
