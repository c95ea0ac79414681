//! Prompt builder: retrieved rows folded into a single instruction.

use std::io;

use rag_store::BookingRecord;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::error::ContextorError;

/// Builds `Using this data {json}, answer: {query}`.
///
/// `{json}` is the array of records with `", "` and `": "` separators, the
/// layout the answer model has been prompted with so far.
pub fn build_prompt(records: &[BookingRecord], query: &str) -> Result<String, ContextorError> {
    let json = to_spaced_json(records)?;
    Ok(format!("Using this data {json}, answer: {query}"))
}

fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ContextorError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Single-line JSON with a space after every `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}
