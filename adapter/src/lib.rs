#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
//! Authentication of the requests made to the Search Ad API.
//!
//! The [`Signer`] produces the per-request [`SignedHeaders`] out of the
//! account's [`Credentials`].

pub use self::{
    credentials::Credentials,
    error::Error,
    signer::{sign, Method, Signature, SignedHeaders, Signer, Timestamp},
};

pub mod credentials;
pub mod error;
pub mod signer;
