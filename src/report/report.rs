// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::tcb::Tcb;
use sev::firmware::guest::{AttestationReport as SnpReport, Version};
use std::io;

/// Size of an ATTESTATION_REPORT structure, signature included
pub const REPORT_SIZE: usize = 0x4a0;

/// First report version carrying the CPUID family, model and stepping
pub const REPORT_VERSION_3: u32 = 3;

/// SIGNING_KEY value for a report signed with the chip-unique VCEK
pub const SIGNER_VCEK: u32 = 0;
/// SIGNING_KEY value for a report signed with a CSP-provisioned VLEK
pub const SIGNER_VLEK: u32 = 1;

/// Firmware version triple, as found in CURRENT_* and COMMITTED_*
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl From<Version> for FirmwareVersion {
    fn from(v: Version) -> Self {
        Self {
            major: v.major,
            minor: v.minor,
            build: v.build,
        }
    }
}

/// The report fields that reference values are made of.  Decoding is done
/// by `sev`; see Table 23 of "SEV Secure Nested Paging Firmware ABI
/// Specification" rev. 1.57 for the layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttestationReport {
    pub version: u32,
    pub guest_svn: u32,
    pub policy: u64,
    pub family_id: [u8; 16],
    pub image_id: [u8; 16],
    pub vmpl: u32,
    pub current_tcb: Tcb,
    pub platform_info: u64,
    pub key_info: u32,
    pub report_data: [u8; 64],
    pub measurement: [u8; 48],
    pub host_data: [u8; 32],
    pub id_key_digest: [u8; 48],
    pub author_key_digest: [u8; 48],
    pub report_id: [u8; 32],
    pub report_id_ma: [u8; 32],
    pub reported_tcb: Tcb,
    // zero in version 2 reports
    pub cpuid_fam_id: u8,
    pub cpuid_mod_id: u8,
    pub cpuid_step: u8,
    pub chip_id: [u8; 64],
    pub committed_tcb: Tcb,
    pub current: FirmwareVersion,
    pub committed: FirmwareVersion,
    pub launch_tcb: Tcb,
}

impl Default for AttestationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&SnpReport> for AttestationReport {
    fn from(r: &SnpReport) -> Self {
        Self {
            version: r.version,
            guest_svn: r.guest_svn,
            policy: u64::from(r.policy),
            family_id: *r.family_id,
            image_id: *r.image_id,
            vmpl: r.vmpl,
            current_tcb: Tcb::from(r.current_tcb),
            platform_info: u64::from(r.plat_info),
            key_info: u32::from(r.key_info),
            report_data: *r.report_data,
            measurement: *r.measurement,
            host_data: *r.host_data,
            id_key_digest: *r.id_key_digest,
            author_key_digest: *r.author_key_digest,
            report_id: *r.report_id,
            report_id_ma: *r.report_id_ma,
            reported_tcb: Tcb::from(r.reported_tcb),
            cpuid_fam_id: r.cpuid_fam_id.unwrap_or_default(),
            cpuid_mod_id: r.cpuid_mod_id.unwrap_or_default(),
            cpuid_step: r.cpuid_step.unwrap_or_default(),
            chip_id: *r.chip_id,
            committed_tcb: Tcb::from(r.committed_tcb),
            current: r.current.into(),
            committed: r.committed.into(),
            launch_tcb: Tcb::from(r.launch_tcb),
        }
    }
}

impl AttestationReport {
    pub fn new() -> Self {
        Self {
            version: 0,
            guest_svn: 0,
            policy: 0,
            family_id: [0; 16],
            image_id: [0; 16],
            vmpl: 0,
            current_tcb: Tcb::default(),
            platform_info: 0,
            key_info: 0,
            report_data: [0; 64],
            measurement: [0; 48],
            host_data: [0; 32],
            id_key_digest: [0; 48],
            author_key_digest: [0; 48],
            report_id: [0; 32],
            report_id_ma: [0; 32],
            reported_tcb: Tcb::default(),
            cpuid_fam_id: 0,
            cpuid_mod_id: 0,
            cpuid_step: 0,
            chip_id: [0; 64],
            committed_tcb: Tcb::default(),
            current: FirmwareVersion::default(),
            committed: FirmwareVersion::default(),
            launch_tcb: Tcb::default(),
        }
    }

    /// Decode a little-endian ATTESTATION_REPORT.  The signature is not
    /// checked.
    pub fn decode(buf: &[u8]) -> Result<AttestationReport, Error> {
        // sev reads the version and CPUID family before checking the size
        if buf.len() != REPORT_SIZE {
            return Err(Error::Syntax(format!(
                "report: expecting {REPORT_SIZE} bytes, got {}",
                buf.len()
            )));
        }

        let r = SnpReport::from_bytes(buf).map_err(|e| match e.kind() {
            io::ErrorKind::Unsupported => Error::Sema("unsupported report version".to_string()),
            _ => Error::Syntax(format!("report: {e}")),
        })?;

        Ok(AttestationReport::from(&r))
    }

    /// The SIGNING_KEY selector: 0 for VCEK, 1 for VLEK, 7 for none
    pub fn signer_info(&self) -> u32 {
        sev::firmware::guest::KeyInfo::from(self.key_info).signing_key()
    }

    pub fn author_key_en(&self) -> bool {
        sev::firmware::guest::KeyInfo::from(self.key_info).author_key_en()
    }
}
