pub mod db;
pub mod ledger;
pub mod merchants;
pub mod transactions;

pub use db::{create_db, DbPool, StorageError};
pub use ledger::{
    get_all_accounts, get_statements_for_account, get_tags_for_transaction, insert_account,
    insert_statement, insert_tag, tag_transaction,
};
pub use merchants::{
    delete_merchant_location, get_all_merchant_locations, get_all_merchants,
    get_locations_for_merchant, get_merchant_by_id, insert_merchant, insert_merchant_location,
};
pub use transactions::{
    delete_transaction, get_all_transactions, get_transaction_by_id, upsert_transaction,
};
