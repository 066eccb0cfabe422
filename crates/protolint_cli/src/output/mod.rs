//! Output formatting module

mod codeclimate;

pub use codeclimate::CodeClimateWriter;
