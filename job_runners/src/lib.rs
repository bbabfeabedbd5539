pub mod notifier;
pub mod scraper;
pub mod test_notifier;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
