// Trade validation module
pub mod validation;

pub use validation::{
    normalize_symbol, validate_new_trade, validate_trade_update, TradeChanges, ValidatedTrade,
};
