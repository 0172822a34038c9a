// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The report module decodes the binary SEV-SNP ATTESTATION_REPORT into an
//! [`AttestationReport`] whose fields are read by the reference value mapper.

pub use self::errors::Error;
pub use self::report::AttestationReport;
pub use self::report::FirmwareVersion;
pub use self::report::{REPORT_SIZE, REPORT_VERSION_3, SIGNER_VCEK, SIGNER_VLEK};
pub use self::tcb::Tcb;

mod errors;
#[allow(clippy::module_inception)]
mod report;
mod tcb;
