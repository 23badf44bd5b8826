//! Dashboard module
//!
//! Provides income and expense summaries over a user's financial records,
//! both across all of their assets and for a single asset.

mod aggregation;
mod handlers;

pub use aggregation::{FinancialSummary, MonthKey, MonthlyTotals, summarize};
pub use handlers::{get_asset_summary_endpoint, get_dashboard_endpoint};
