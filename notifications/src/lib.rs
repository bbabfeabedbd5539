pub mod adaptive_card;
pub mod change_detector;
pub mod config;
pub mod delivery;
pub mod history;
pub mod notify;
