// Paper trading statistics module
pub mod paper;

pub use paper::{
    DirectionStats, GeneralStats, PaperTradingStats, SymbolStats, TOP_SYMBOLS_LIMIT,
};
