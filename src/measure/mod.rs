// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The measure module defines how expected SEV-SNP launch digests are
//! obtained.  The digest of a guest depends on the firmware image, the
//! number and type of its vCPUs and the VMM that launched it, so it is
//! recomputed for every topology rather than copied from the report.
//!
//! [`LaunchDigester`] is the seam; [`SevLaunchDigester`] implements it on
//! top of the `sev` crate.

pub use self::errors::Error;
pub use self::snp::SevLaunchDigester;

mod errors;
mod snp;

use serde::Deserialize;
use std::fmt;

/// Guest features (SEV_FEATURES) the reference guest is launched with
pub const GUEST_FEATURES: u64 = 0x1;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VmmType {
    #[default]
    Qemu,
    Ec2,
    Krun,
}

impl fmt::Display for VmmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmmType::Qemu => f.write_str("qemu"),
            VmmType::Ec2 => f.write_str("ec2"),
            VmmType::Krun => f.write_str("krun"),
        }
    }
}

/// Launch parameters of the guest whose digest is computed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchParams<'a> {
    pub vcpus: u32,
    pub guest_features: u64,
    pub vmm: VmmType,
    pub cpu_model: &'a str,
}

pub trait LaunchDigester {
    /// Compute the SHA-384 launch digest of a guest booted with the given
    /// parameters.  The same parameters always yield the same digest.
    fn launch_digest(&mut self, params: &LaunchParams) -> Result<Vec<u8>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        vmm: VmmType,
    }

    #[test]
    fn vmm_type_from_config_strings() {
        for (s, v) in [
            ("qemu", VmmType::Qemu),
            ("ec2", VmmType::Ec2),
            ("krun", VmmType::Krun),
        ] {
            let w: Wrapper = serde_json::from_str(&format!(r#"{{"vmm": "{s}"}}"#)).unwrap();
            assert_eq!(w.vmm, v);
            assert_eq!(v.to_string(), s);
        }

        assert!(serde_json::from_str::<Wrapper>(r#"{"vmm": "xen"}"#).is_err());
    }
}
