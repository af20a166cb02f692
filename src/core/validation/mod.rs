//! Request body validation
//!
//! Request payloads are deserialized and checked with `validator` rules by
//! the [`Validated`] extractor before they reach a handler.

pub mod extractor;
pub mod validators;

pub use extractor::Validated;
