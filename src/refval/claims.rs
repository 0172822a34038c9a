// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::environment::is_all_zeros;
use super::measurement::{HashAlg, Measurement, MeasurementValue, Svn, VersionScheme};
use crate::report::{AttestationReport, FirmwareVersion, Tcb, REPORT_VERSION_3};

pub const MKEY_VERSION: u64 = 0;
pub const MKEY_GUEST_SVN: u64 = 1;
pub const MKEY_POLICY: u64 = 2;
pub const MKEY_FAMILY_ID: u64 = 3;
pub const MKEY_IMAGE_ID: u64 = 4;
pub const MKEY_VMPL: u64 = 5;
pub const MKEY_CURRENT_TCB: u64 = 6;
pub const MKEY_PLATFORM_INFO: u64 = 7;
pub const MKEY_REPORT_DATA: u64 = 640;
pub const MKEY_MEASUREMENT: u64 = 641;
pub const MKEY_HOST_DATA: u64 = 642;
pub const MKEY_ID_KEY_DIGEST: u64 = 643;
pub const MKEY_AUTHOR_KEY_DIGEST: u64 = 644;
pub const MKEY_REPORT_ID: u64 = 645;
pub const MKEY_REPORT_ID_MA: u64 = 646;
pub const MKEY_REPORTED_TCB: u64 = 647;
pub const MKEY_CPUID_FAM_ID: u64 = 648;
pub const MKEY_CPUID_MOD_ID: u64 = 649;
pub const MKEY_CPUID_STEP: u64 = 650;
pub const MKEY_CHIP_ID: u64 = 3328;
pub const MKEY_COMMITTED_TCB: u64 = 3329;
pub const MKEY_CURRENT_VERSION: u64 = 3330;
pub const MKEY_COMMITTED_VERSION: u64 = 3936;
pub const MKEY_LAUNCH_TCB: u64 = 3968;

/// Where a claim takes its value from, and how the value is encoded
#[derive(Clone, Copy)]
enum Source {
    /// unsigned field rendered as a decimal version string
    Decimal(fn(&AttestationReport) -> u64),
    /// unsigned field asserted as a minimum SVN
    MinSvn(fn(&AttestationReport) -> u64),
    /// unsigned field as a fixed-width big-endian byte string
    BigEndian(usize, fn(&AttestationReport) -> u64),
    /// byte field, zero-padded to the given width
    Raw(usize, for<'a> fn(&'a AttestationReport) -> &'a [u8]),
    /// TCB asserted as an exact SVN
    Svn(fn(&AttestationReport) -> Tcb),
    /// firmware version as a semantic version string
    SemVer(fn(&AttestationReport) -> FirmwareVersion),
    /// launch digest for the topology being evaluated
    LaunchDigest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Emit {
    Always,
    /// skipped when the raw field is all zeros
    UnlessZero,
    /// skipped for reports older than the given version
    SinceVersion(u32),
}

struct Claim {
    key: u64,
    name: &'static str,
    source: Source,
    emit: Emit,
}

/// The report field to measurement key mapping, in output order
static CLAIMS: [Claim; 24] = [
    Claim {
        key: MKEY_VERSION,
        name: "version",
        source: Source::Decimal(|r| u64::from(r.version)),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_GUEST_SVN,
        name: "guest-svn",
        source: Source::MinSvn(|r| u64::from(r.guest_svn)),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_POLICY,
        name: "policy",
        source: Source::BigEndian(8, |r| r.policy),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_FAMILY_ID,
        name: "family-id",
        source: Source::Raw(16, |r| &r.family_id),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_IMAGE_ID,
        name: "image-id",
        source: Source::Raw(16, |r| &r.image_id),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_VMPL,
        name: "vmpl",
        source: Source::BigEndian(4, |r| u64::from(r.vmpl)),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_CURRENT_TCB,
        name: "current-tcb",
        source: Source::Svn(|r| r.current_tcb),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_PLATFORM_INFO,
        name: "platform-info",
        source: Source::BigEndian(8, |r| r.platform_info),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_REPORT_DATA,
        name: "report-data",
        source: Source::Raw(64, |r| &r.report_data),
        emit: Emit::UnlessZero,
    },
    Claim {
        key: MKEY_MEASUREMENT,
        name: "measurement",
        source: Source::LaunchDigest,
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_HOST_DATA,
        name: "host-data",
        source: Source::Raw(32, |r| &r.host_data),
        emit: Emit::UnlessZero,
    },
    Claim {
        key: MKEY_ID_KEY_DIGEST,
        name: "id-key-digest",
        source: Source::Raw(48, |r| &r.id_key_digest),
        emit: Emit::UnlessZero,
    },
    Claim {
        key: MKEY_AUTHOR_KEY_DIGEST,
        name: "author-key-digest",
        source: Source::Raw(48, |r| &r.author_key_digest),
        emit: Emit::UnlessZero,
    },
    Claim {
        key: MKEY_REPORT_ID,
        name: "report-id",
        source: Source::Raw(32, |r| &r.report_id),
        emit: Emit::UnlessZero,
    },
    Claim {
        key: MKEY_REPORT_ID_MA,
        name: "report-id-ma",
        source: Source::Raw(32, |r| &r.report_id_ma),
        emit: Emit::UnlessZero,
    },
    Claim {
        key: MKEY_REPORTED_TCB,
        name: "reported-tcb",
        source: Source::Svn(|r| r.reported_tcb),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_CPUID_FAM_ID,
        name: "cpuid-fam-id",
        source: Source::BigEndian(1, |r| u64::from(r.cpuid_fam_id)),
        emit: Emit::SinceVersion(REPORT_VERSION_3),
    },
    Claim {
        key: MKEY_CPUID_MOD_ID,
        name: "cpuid-mod-id",
        source: Source::BigEndian(1, |r| u64::from(r.cpuid_mod_id)),
        emit: Emit::SinceVersion(REPORT_VERSION_3),
    },
    Claim {
        key: MKEY_CPUID_STEP,
        name: "cpuid-step",
        source: Source::BigEndian(1, |r| u64::from(r.cpuid_step)),
        emit: Emit::SinceVersion(REPORT_VERSION_3),
    },
    Claim {
        key: MKEY_CHIP_ID,
        name: "chip-id",
        source: Source::Raw(64, |r| &r.chip_id),
        emit: Emit::UnlessZero,
    },
    Claim {
        key: MKEY_COMMITTED_TCB,
        name: "committed-tcb",
        source: Source::Svn(|r| r.committed_tcb),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_CURRENT_VERSION,
        name: "current-version",
        source: Source::SemVer(|r| r.current),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_COMMITTED_VERSION,
        name: "committed-version",
        source: Source::SemVer(|r| r.committed),
        emit: Emit::Always,
    },
    Claim {
        key: MKEY_LAUNCH_TCB,
        name: "launch-tcb",
        source: Source::Svn(|r| r.launch_tcb),
        emit: Emit::Always,
    },
];

impl Claim {
    fn is_emitted(&self, r: &AttestationReport) -> bool {
        match self.emit {
            Emit::Always => true,
            Emit::SinceVersion(v) => r.version >= v,
            Emit::UnlessZero => match self.source {
                Source::Raw(_, field) => !is_all_zeros(field(r)),
                _ => true,
            },
        }
    }

    fn measure(&self, r: &AttestationReport, launch_digest: &[u8]) -> MeasurementValue {
        match self.source {
            Source::Decimal(field) => MeasurementValue::Version {
                version: field(r).to_string(),
                scheme: VersionScheme::Decimal,
            },
            Source::MinSvn(field) => MeasurementValue::Svn(Svn::Min(field(r))),
            Source::BigEndian(width, field) => {
                MeasurementValue::RawBytes(field(r).to_be_bytes()[8 - width..].to_vec())
            }
            Source::Raw(width, field) => MeasurementValue::RawBytes(fixed_width(field(r), width)),
            Source::Svn(field) => MeasurementValue::Svn(Svn::Exact(field(r).raw())),
            Source::SemVer(field) => MeasurementValue::Version {
                version: field(r).to_string(),
                scheme: VersionScheme::SemVer,
            },
            Source::LaunchDigest => MeasurementValue::Digest {
                alg: HashAlg::Sha384,
                value: launch_digest.to_vec(),
            },
        }
    }
}

// copy into a zero-filled buffer of the declared width
fn fixed_width(src: &[u8], width: usize) -> Vec<u8> {
    let mut buf = vec![0u8; width];
    let n = src.len().min(width);
    buf[..n].copy_from_slice(&src[..n]);
    buf
}

/// Map the report fields onto their reference values.  `launch_digest` is the
/// expected launch measurement for the topology being evaluated.
pub fn map_report(r: &AttestationReport, launch_digest: &[u8]) -> Vec<Measurement> {
    CLAIMS
        .iter()
        .filter(|c| c.is_emitted(r))
        .map(|c| Measurement::new(c.key, c.measure(r, launch_digest)))
        .collect()
}

/// Name of the report field behind a measurement key
pub fn claim_name(key: u64) -> Option<&'static str> {
    CLAIMS.iter().find(|c| c.key == key).map(|c| c.name)
}

/// Keys that [`map_report`] emits for every report
pub fn mandatory_keys() -> impl Iterator<Item = u64> {
    CLAIMS
        .iter()
        .filter(|c| c.emit == Emit::Always)
        .map(|c| c.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::collections::BTreeSet;

    const TEST_LAUNCH_DIGEST: [u8; 48] = [0x42; 48];

    fn keys(ms: &[Measurement]) -> BTreeSet<u64> {
        ms.iter().map(|m| m.key).collect()
    }

    fn value(ms: &[Measurement], key: u64) -> &MeasurementValue {
        &ms.iter().find(|m| m.key == key).expect("key present").value
    }

    fn v2_report() -> AttestationReport {
        AttestationReport {
            version: 2,
            guest_svn: 5,
            policy: 0x0030_0000_0000_0000,
            ..Default::default()
        }
    }

    #[test]
    fn table_keys_unique_and_ordered() {
        let ks: Vec<u64> = CLAIMS.iter().map(|c| c.key).collect();
        let mut sorted = ks.clone();
        sorted.sort();
        sorted.dedup();

        assert_eq!(ks, sorted);
    }

    #[test]
    fn table_zero_suppression_only_on_byte_fields() {
        for c in CLAIMS.iter().filter(|c| c.emit == Emit::UnlessZero) {
            assert!(matches!(c.source, Source::Raw(..)), "{}", c.name);
        }
    }

    #[test]
    fn table_suppression_rules() {
        let unless_zero: BTreeSet<u64> = CLAIMS
            .iter()
            .filter(|c| c.emit == Emit::UnlessZero)
            .map(|c| c.key)
            .collect();
        let since_v3: BTreeSet<u64> = CLAIMS
            .iter()
            .filter(|c| c.emit == Emit::SinceVersion(REPORT_VERSION_3))
            .map(|c| c.key)
            .collect();

        assert_eq!(
            unless_zero,
            BTreeSet::from([640, 642, 643, 644, 645, 646, 3328])
        );
        assert_eq!(since_v3, BTreeSet::from([648, 649, 650]));
        assert_eq!(
            mandatory_keys().collect::<BTreeSet<u64>>(),
            BTreeSet::from([0, 1, 2, 3, 4, 5, 6, 7, 641, 647, 3329, 3330, 3936, 3968])
        );
    }

    #[test]
    fn zeroed_v2_report() {
        let ms = map_report(&v2_report(), &TEST_LAUNCH_DIGEST);

        assert_eq!(
            keys(&ms),
            BTreeSet::from([0, 1, 2, 3, 4, 5, 6, 7, 641, 647, 3329, 3330, 3936, 3968])
        );
        assert_eq!(
            value(&ms, MKEY_VERSION),
            &MeasurementValue::Version {
                version: "2".to_string(),
                scheme: VersionScheme::Decimal
            }
        );
        assert_eq!(value(&ms, MKEY_GUEST_SVN), &MeasurementValue::Svn(Svn::Min(5)));
        assert_eq!(
            value(&ms, MKEY_POLICY),
            &MeasurementValue::RawBytes(hex!("0030000000000000").to_vec())
        );
        assert_eq!(
            value(&ms, MKEY_MEASUREMENT),
            &MeasurementValue::Digest {
                alg: HashAlg::Sha384,
                value: TEST_LAUNCH_DIGEST.to_vec()
            }
        );
    }

    #[test]
    fn big_endian_widths() {
        let r = AttestationReport {
            vmpl: 0x0102_0304,
            platform_info: 0x25,
            ..v2_report()
        };
        let ms = map_report(&r, &TEST_LAUNCH_DIGEST);

        assert_eq!(
            value(&ms, MKEY_VMPL),
            &MeasurementValue::RawBytes(hex!("01020304").to_vec())
        );
        assert_eq!(
            value(&ms, MKEY_PLATFORM_INFO),
            &MeasurementValue::RawBytes(hex!("0000000000000025").to_vec())
        );
    }

    #[test]
    fn report_data_single_nonzero_byte() {
        let mut r = v2_report();
        r.report_data[63] = 0x01;

        let ms = map_report(&r, &TEST_LAUNCH_DIGEST);

        match value(&ms, MKEY_REPORT_DATA) {
            MeasurementValue::RawBytes(b) => {
                assert_eq!(b.len(), 64);
                assert_eq!(b[..], r.report_data[..]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nonzero_byte_fields_present() {
        let mut r = v2_report();
        r.host_data = [0x11; 32];
        r.id_key_digest = [0x22; 48];
        r.author_key_digest = [0x33; 48];
        r.report_id = [0x44; 32];
        r.report_id_ma = [0x55; 32];
        r.chip_id = [0x66; 64];

        let ms = map_report(&r, &TEST_LAUNCH_DIGEST);

        for key in [642, 643, 644, 645, 646, 3328] {
            assert!(keys(&ms).contains(&key), "{key}");
        }
        assert_eq!(
            value(&ms, MKEY_CHIP_ID),
            &MeasurementValue::RawBytes(vec![0x66; 64])
        );
        assert!(!keys(&ms).contains(&MKEY_REPORT_DATA));
    }

    #[test]
    fn cpuid_only_since_v3() {
        let mut r = v2_report();
        r.cpuid_fam_id = 0x19;
        r.cpuid_mod_id = 0x11;
        r.cpuid_step = 0x01;

        let ms = map_report(&r, &TEST_LAUNCH_DIGEST);
        assert!(!keys(&ms).contains(&MKEY_CPUID_FAM_ID));

        r.version = 3;
        let ms = map_report(&r, &TEST_LAUNCH_DIGEST);

        assert_eq!(
            value(&ms, MKEY_CPUID_FAM_ID),
            &MeasurementValue::RawBytes(vec![0x19])
        );
        assert_eq!(
            value(&ms, MKEY_CPUID_MOD_ID),
            &MeasurementValue::RawBytes(vec![0x11])
        );
        assert_eq!(
            value(&ms, MKEY_CPUID_STEP),
            &MeasurementValue::RawBytes(vec![0x01])
        );
    }

    #[test]
    fn cpuid_zero_values_still_present_since_v3() {
        let r = AttestationReport {
            version: 3,
            ..v2_report()
        };
        let ms = map_report(&r, &TEST_LAUNCH_DIGEST);

        assert_eq!(
            value(&ms, MKEY_CPUID_STEP),
            &MeasurementValue::RawBytes(vec![0x00])
        );
    }

    #[test]
    fn tcbs_and_firmware_versions() {
        let mut r = v2_report();
        r.current_tcb = Tcb(0x7300_0800_0000_0003);
        r.reported_tcb = Tcb(1);
        r.committed_tcb = Tcb(2);
        r.launch_tcb = Tcb(3);
        r.current = FirmwareVersion {
            major: 1,
            minor: 55,
            build: 21,
        };
        r.committed = FirmwareVersion {
            major: 1,
            minor: 55,
            build: 20,
        };

        let ms = map_report(&r, &TEST_LAUNCH_DIGEST);

        assert_eq!(
            value(&ms, MKEY_CURRENT_TCB),
            &MeasurementValue::Svn(Svn::Exact(0x7300_0800_0000_0003))
        );
        assert_eq!(value(&ms, MKEY_REPORTED_TCB), &MeasurementValue::Svn(Svn::Exact(1)));
        assert_eq!(value(&ms, MKEY_COMMITTED_TCB), &MeasurementValue::Svn(Svn::Exact(2)));
        assert_eq!(value(&ms, MKEY_LAUNCH_TCB), &MeasurementValue::Svn(Svn::Exact(3)));
        assert_eq!(
            value(&ms, MKEY_CURRENT_VERSION),
            &MeasurementValue::Version {
                version: "1.55.21".to_string(),
                scheme: VersionScheme::SemVer
            }
        );
        assert_eq!(
            value(&ms, MKEY_COMMITTED_VERSION),
            &MeasurementValue::Version {
                version: "1.55.20".to_string(),
                scheme: VersionScheme::SemVer
            }
        );
    }

    #[test]
    fn short_source_is_zero_padded() {
        assert_eq!(fixed_width(&[1, 2], 4), vec![1, 2, 0, 0]);
        assert_eq!(fixed_width(&[1, 2, 3], 2), vec![1, 2]);
    }

    #[test]
    fn names() {
        assert_eq!(claim_name(MKEY_LAUNCH_TCB), Some("launch-tcb"));
        assert_eq!(claim_name(9999), None);
    }
}
