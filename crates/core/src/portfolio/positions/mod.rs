mod position_reconstructor;
mod positions_model;


pub use position_reconstructor::{reconstruct, replay_ledger, LedgerReplay};
pub use positions_model::{is_quantity_significant, Position, PositionBook, SellOutcome};
