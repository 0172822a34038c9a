// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The refval module turns a decoded [`AttestationReport`] into reference
//! values: an [`Environment`] derived from the report signer, and the
//! [`Measurement`]s produced by [`map_report`] from the fixed claims table.
//!
//! [`AttestationReport`]: crate::report::AttestationReport

pub use self::claims::*;
pub use self::environment::{ClassId, Environment};
pub use self::measurement::{HashAlg, Measurement, MeasurementValue, Svn, VersionScheme};
pub use self::triple::ValueTriple;

mod claims;
mod environment;
mod measurement;
mod triple;
