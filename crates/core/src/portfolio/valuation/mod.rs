mod last_known_prices;
mod valuation_calculator;
mod valuation_model;


pub use last_known_prices::LastKnownPrices;
pub use valuation_calculator::valuate;
pub use valuation_model::{PriceInput, ValuedPosition};
