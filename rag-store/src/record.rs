//! Core data models used by the library.

use serde_json::{Map, Value};

/// One dataset row as `column → value`, in file column order.
pub type BookingRecord = Map<String, Value>;

/// Query parameters for retrieval.
#[derive(Clone, Copy, Debug)]
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: usize,
}

/// A retrieved row, its dataset position and its index score.
#[derive(Clone, Debug, PartialEq)]
pub struct RagHit {
    pub position: usize,
    pub score: f32,
    pub record: BookingRecord,
}
