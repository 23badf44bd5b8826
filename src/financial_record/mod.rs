//! Income and expense records attached to assets.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    CreateRecordRequest, FinancialRecord, NewFinancialRecord, RecordKind, UpdateRecordRequest,
    count_financial_records, create_financial_record, create_financial_record_table,
    delete_financial_record, get_financial_record, get_financial_records, update_financial_record,
    validate_amount, validate_date_range,
};
pub use create_endpoint::create_record_endpoint;
pub use delete_endpoint::delete_record_endpoint;
pub use edit_endpoint::edit_record_endpoint;
pub use list_endpoint::list_records_endpoint;
