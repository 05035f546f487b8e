pub mod transaction_dto;

pub use transaction_dto::{
    CategoryTotalDto, TransactionFilterQuery, TransactionRequestDto, TransactionResponseDto,
    UpdateTransactionDto,
};
