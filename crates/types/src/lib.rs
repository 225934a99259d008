//! ledger-types: typed descriptors for the values a ledger JSON API returns.
//!
//! Every domain type has a descriptor: a value (or, for Rust types, a
//! [`Serializable`] impl) that produces a validating [`Decoder`] on demand.
//! Descriptors compose. `list`, `optional`, `text_map` and `contract_id`
//! turn a component descriptor into the descriptor of a container, and
//! [`contract`] builds the descriptor of a whole contract instance from a
//! [`Template`].
//!
//! Decoders are produced lazily so that record types may refer to
//! themselves, directly or through each other.
//!
//! ```
//! use ledger_types::{Descriptor, Party, list};
//!
//! let parties = list(&Descriptor::<Party>::of());
//! let decoded = parties.decoder().decode(&serde_json::json!(["Alice", "Bob"])).unwrap();
//! assert_eq!(decoded[1].as_str(), "Bob");
//! ```

pub mod contract;
pub mod descriptor;
pub mod grammar;
pub mod primitives;
pub mod query;
pub mod template;

pub use contract::{contract, contract_with, contract_with_policy, Contract, ContractId};
pub use descriptor::{contract_id, list, optional, text_map, Descriptor, Serializable};
pub use grammar::{checked, with_policy, GrammarError, GrammarPolicy, Textual, GRAMMAR_ENV};
pub use primitives::{Bool, Date, Decimal, Int, List, Optional, Party, Text, TextMap, Time, Unit};
pub use query::Query;
pub use template::{Choice, Identifier, Template, TemplateRef, ARCHIVE};

pub use ledger_decode::{DecodeError, Decoder, JsonPath, PathSegment, ValidationError};
