pub mod transaction_handler;

pub use transaction_handler::{
    __path_by_category, __path_create_transaction, __path_delete_transaction,
    __path_get_transaction, __path_list_transactions, __path_patch_transaction,
    __path_update_transaction, by_category, create_transaction, delete_transaction,
    get_transaction, list_transactions, patch_transaction, update_transaction,
};
