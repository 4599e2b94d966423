pub mod coingecko;
pub mod goldapi;
pub mod nbrb;
pub mod util;
