pub mod amcs;
pub mod compare;
pub mod detail;
pub mod funds;
pub mod setup;
pub mod ui;
