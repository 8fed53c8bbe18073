//! Fee-rate units used when pricing sweep transactions.

mod rates;

pub use rates::{SatPerKVByte, SatPerKWeight, ABSOLUTE_FEE_PER_KW_FLOOR, FEE_PER_KW_FLOOR};
