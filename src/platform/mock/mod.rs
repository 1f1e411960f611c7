//! Mock platform implementations for testing

pub mod flash;

pub use flash::MockFlash;
