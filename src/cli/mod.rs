pub mod convert;
pub mod crypto;
pub mod history;
pub mod rates;
pub mod ui;
