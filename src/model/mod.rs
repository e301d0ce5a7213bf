// File: ./src/model/mod.rs
pub mod dates;
pub mod parser;
pub mod result;

pub use result::{NeededField, ParseResult, Suggestion, SuggestionKind, SuggestionValue};
