mod transaction;

pub use transaction::{CategoryTotal, Transaction, TransactionInput, TransactionType};
