//! ledger-decode: composable JSON validation decoders.
//!
//! A [`Decoder<T>`] is a shareable function from `&serde_json::Value` to
//! `Result<T, ValidationError>`. Leaf decoders accept one JSON kind;
//! combinators (`array`, `dict`, `object`, `nullable`, `one_of`, `lazy`)
//! build decoders for structured values and prefix the JSON path of any
//! failure as it propagates outward.
//!
//! This crate knows nothing about ledger types. `ledger-types` builds its
//! descriptor registry on top of it.

pub mod decoder;
pub mod error;

pub use decoder::{
    any_json, array, boolean, constant, dict, empty_object, nullable, object, one_of, string,
    Decoder, Fields,
};
pub use error::{kind_of, DecodeError, JsonPath, PathSegment, ValidationError};
