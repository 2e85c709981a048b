//! Software token engine for RSA SecurID-compatible tokencodes.
//!
//! A [`TokenContext`] owns one imported token record. Records are accepted in
//! the numeric CTF format (v1/v2), the base64 v3 format and the sdtid XML
//! format. The seed stays encrypted until [`TokenContext::decrypt_seed`] is
//! called with the right password and/or device ID; tokencodes can only be
//! computed while a decrypted seed is loaded.

pub mod constants;
pub mod context;
mod crypto;
pub mod error;
mod exporters;
pub mod parsers;
pub mod pin;
pub mod tokencode;
pub mod types;

pub use context::TokenContext;
pub use error::{ErrorKind, Result, Status, TokenError};
pub use pin::Pin;
pub use tokencode::format_tokencode;
pub use types::{find_guid, guid_list, Guid, PinRange, Seed, Token, TokenConfig, TokenFlags, TokenInfo};
