//! Descriptors and the parametric type constructors.
//!
//! A descriptor pairs a type with a zero-argument operation producing its
//! decoder. Rust types get one through [`Serializable`]; [`Descriptor`] is
//! the value-level form that constructors such as [`list`] take and return.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ledger_decode::{array, dict, nullable, DecodeError, Decoder, ValidationError};
use serde_json::Value;

use crate::contract::ContractId;

/// Types whose JSON encoding is described by a decoder.
///
/// `decoder()` must not build the decoders of types that may refer back to
/// `Self`. Going through the container impls below (or through
/// [`Descriptor::lazy_decoder`]) defers those until decode time.
pub trait Serializable: Sized + 'static {
    fn decoder() -> Decoder<Self>;
}

type MakeDecoder<T> = dyn Fn() -> Decoder<T> + Send + Sync;

/// The value-level companion of a type: produces its decoder on demand.
pub struct Descriptor<T> {
    make: Arc<MakeDecoder<T>>,
}

impl<T> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Descriptor {
            make: Arc::clone(&self.make),
        }
    }
}

impl<T> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Descriptor<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> Descriptor<T> {
    pub fn new<F>(make: F) -> Self
    where
        F: Fn() -> Decoder<T> + Send + Sync + 'static,
    {
        Descriptor {
            make: Arc::new(make),
        }
    }

    /// The descriptor of a [`Serializable`] type.
    pub fn of() -> Self
    where
        T: Serializable,
    {
        Descriptor::new(T::decoder)
    }

    /// Produce a fresh decoder. Cheap, pure, and callable any number of times.
    pub fn decoder(&self) -> Decoder<T> {
        (self.make)()
    }

    /// A decoder that calls [`Descriptor::decoder`] only once input reaches it.
    pub fn lazy_decoder(&self) -> Decoder<T> {
        let this = self.clone();
        Decoder::lazy(move || this.decoder())
    }

    pub fn decode(&self, value: &Value) -> Result<T, ValidationError> {
        self.decoder().decode(value).inspect_err(|e| {
            tracing::debug!(ty = std::any::type_name::<T>(), error = %e, "decode failed");
        })
    }

    pub fn decode_str(&self, text: &str) -> Result<T, DecodeError> {
        self.decoder().decode_str(text).inspect_err(|e| {
            tracing::debug!(ty = std::any::type_name::<T>(), error = %e, "decode failed");
        })
    }
}

impl<T: Serializable> Default for Descriptor<T> {
    fn default() -> Self {
        Descriptor::of()
    }
}

// ── Parametric constructors ─────────────────────────────────────────

/// `List<T>`: a JSON array of `T`.
pub fn list<T: 'static>(t: &Descriptor<T>) -> Descriptor<Vec<T>> {
    let t = t.clone();
    Descriptor::new(move || array(t.lazy_decoder()))
}

/// `Optional<T>`: `null` or a `T`.
///
/// Nested optionals are not disambiguated: for `Optional<Optional<T>>`,
/// `null` is always the outer `None`.
pub fn optional<T: 'static>(t: &Descriptor<T>) -> Descriptor<Option<T>> {
    let t = t.clone();
    Descriptor::new(move || nullable(t.lazy_decoder()))
}

/// `TextMap<T>`: a JSON object mapping strings to `T`.
pub fn text_map<T: 'static>(t: &Descriptor<T>) -> Descriptor<BTreeMap<String, T>> {
    let t = t.clone();
    Descriptor::new(move || dict(t.lazy_decoder()))
}

/// `ContractId<T>`: a JSON string. `T` only exists at the type level.
pub fn contract_id<T: 'static>(_t: &Descriptor<T>) -> Descriptor<ContractId<T>> {
    Descriptor::of()
}

// ── Container impls ─────────────────────────────────────────────────

impl<T: Serializable> Serializable for Vec<T> {
    fn decoder() -> Decoder<Self> {
        list(&Descriptor::<T>::of()).decoder()
    }
}

impl<T: Serializable> Serializable for Option<T> {
    fn decoder() -> Decoder<Self> {
        optional(&Descriptor::<T>::of()).decoder()
    }
}

impl<T: Serializable> Serializable for BTreeMap<String, T> {
    fn decoder() -> Decoder<Self> {
        text_map(&Descriptor::<T>::of()).decoder()
    }
}

/// Opaque JSON, accepted without validation.
impl Serializable for Value {
    fn decoder() -> Decoder<Self> {
        ledger_decode::any_json()
    }
}
