// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The corim module packages reference value triples into a CBOR encoded
//! unsigned CoRIM.  For the format, see the IETF "Concise Reference
//! Integrity Manifest" draft.

pub use self::corim::{Corim, PROFILE};
pub use self::errors::Error;

#[allow(clippy::module_inception)]
mod corim;
mod encode;
mod errors;

use crate::refval::ValueTriple;

/// Collects reference value triples and serialises them once complete
pub trait DocumentSink {
    /// Add a triple.  Triples are kept in the order they are appended.
    fn append(&mut self, triple: ValueTriple) -> Result<(), Error>;

    /// Serialise everything appended so far
    fn finalize(&self) -> Result<Vec<u8>, Error>;
}
