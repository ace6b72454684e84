//! Streaming stages of the ingestion pipeline
//!
//! Everything here operates on `Read` byte streams so that
//! multi-hundred-megabyte exports flow through a bounded buffer:
//! decompression ([`decompress`]), line reassembly ([`lines`]) and tar
//! member extraction ([`archive`]).

pub mod archive;
pub mod decompress;
pub mod lines;

pub use archive::{extract_member, ArchiveError};
pub use decompress::{Codec, Decompressor};
pub use lines::{LineAssembler, LineStream};
