// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! AMD SEV-SNP reference values generation.
//!
//! This crate turns an SEV-SNP attestation report, taken from a known-good
//! guest, into CoRIM reference values that a verifier can later use to
//! appraise evidence from the same workload.
//!
//! The API allows:
//! * Decoding a binary SEV-SNP ATTESTATION_REPORT
//! * Mapping the report fields onto measurement keys and deriving the
//!   environment identity from the report signer
//! * Recomputing the expected launch digest for a range of vCPU counts
//! * Encoding the resulting reference value triples as an unsigned CoRIM
//!
//! The signature of the report is not verified.

pub mod config;
pub mod corim;
pub mod generator;
pub mod measure;
pub mod refval;
pub mod report;

mod errors;

pub use self::errors::Error;
