// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::{LaunchDigester, LaunchParams, VmmType};
use sev::measurement::{
    snp::{calc_snp_ovmf_hash, snp_calc_launch_digest, SnpMeasurementArgs},
    vcpu_types::CpuType,
    vmsa::{GuestFeatures, VMMType},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Launch digest calculator for OVMF-booted SEV-SNP guests.  The OVMF hash
/// does not depend on the topology and is computed once per firmware image.
#[derive(Debug)]
pub struct SevLaunchDigester {
    ovmf: PathBuf,
    ovmf_hash: Option<String>,
}

impl SevLaunchDigester {
    pub fn new(ovmf: &Path) -> Self {
        Self {
            ovmf: ovmf.to_path_buf(),
            ovmf_hash: None,
        }
    }

    fn ovmf_hash(&mut self) -> Result<String, Error> {
        if let Some(h) = &self.ovmf_hash {
            return Ok(h.clone());
        }

        let h = calc_snp_ovmf_hash(self.ovmf.clone())
            .map_err(|e| Error::Firmware(format!("{}: {e:?}", self.ovmf.display())))?
            .get_hex_ld();

        debug!(ovmf = %self.ovmf.display(), hash = %h, "computed OVMF hash");

        self.ovmf_hash = Some(h.clone());

        Ok(h)
    }
}

fn vmm_type(v: VmmType) -> VMMType {
    match v {
        VmmType::Qemu => VMMType::QEMU,
        VmmType::Ec2 => VMMType::EC2,
        VmmType::Krun => VMMType::KRUN,
    }
}

impl LaunchDigester for SevLaunchDigester {
    fn launch_digest(&mut self, params: &LaunchParams) -> Result<Vec<u8>, Error> {
        let vcpu_type = CpuType::try_from(params.cpu_model)
            .map_err(|e| Error::Model(format!("{}: {e:?}", params.cpu_model)))?;

        let ovmf_hash = self.ovmf_hash()?;

        let args = SnpMeasurementArgs {
            vcpus: params.vcpus,
            vcpu_type,
            ovmf_file: self.ovmf.clone(),
            guest_features: GuestFeatures(params.guest_features),
            kernel_file: None,
            initrd_file: None,
            append: None,
            ovmf_hash_str: Some(ovmf_hash.as_str()),
            vmm_type: Some(vmm_type(params.vmm)),
        };

        let ld = snp_calc_launch_digest(args).map_err(|e| Error::Digest(format!("{e:?}")))?;

        hex::decode(ld.get_hex_ld()).map_err(|e| Error::Digest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_OVMF_HASH: &str = "cf2c57e07b0c4e1a0dd4a2bbd5a5b30b2b4a8f41d1c7f6cd1bd59c5a34ab1e42\
                                  9c3f4bbd5a7a3f4e3ac1e1d1bd9a0a34";

    fn params(cpu_model: &str) -> LaunchParams {
        LaunchParams {
            vcpus: 1,
            guest_features: crate::measure::GUEST_FEATURES,
            vmm: VmmType::Qemu,
            cpu_model,
        }
    }

    fn missing_ovmf() -> (tempfile::TempDir, SevLaunchDigester) {
        let dir = tempfile::tempdir().unwrap();
        let d = SevLaunchDigester::new(&dir.path().join("OVMF.fd"));
        (dir, d)
    }

    #[test]
    fn bad_missing_firmware() {
        let (_dir, mut d) = missing_ovmf();

        let res = d.launch_digest(&params("epyc-v4"));

        assert!(matches!(res, Err(Error::Firmware(_))));
        assert!(d.ovmf_hash.is_none());
    }

    #[test]
    fn bad_model_is_checked_first() {
        let (_dir, mut d) = missing_ovmf();

        let res = d.launch_digest(&params("not-a-cpu"));

        assert!(matches!(res, Err(Error::Model(_))));
    }

    #[test]
    fn cached_ovmf_hash_is_reused() {
        let (_dir, mut d) = missing_ovmf();
        d.ovmf_hash = Some(TEST_OVMF_HASH.to_string());

        assert_eq!(d.ovmf_hash().unwrap(), TEST_OVMF_HASH);

        // the firmware itself is still needed for the VMSA pages
        let res = d.launch_digest(&params("epyc-v4"));

        assert!(matches!(res, Err(Error::Digest(_))));
    }

    #[test]
    fn vmm_types() {
        assert!(matches!(vmm_type(VmmType::Qemu), VMMType::QEMU));
        assert!(matches!(vmm_type(VmmType::Ec2), VMMType::EC2));
        assert!(matches!(vmm_type(VmmType::Krun), VMMType::KRUN));
    }
}
