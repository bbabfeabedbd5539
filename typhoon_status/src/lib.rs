pub mod clock;
pub mod config;
pub mod contracts;
pub mod county;
pub mod page_parser;
pub mod persistence;
pub mod web_page_reader;
