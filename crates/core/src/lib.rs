#![forbid(unsafe_code)]

pub mod catalog;
pub mod clock;
pub mod ledger;
pub mod model;
pub mod selector;
pub mod time;

pub use time::Clock;
