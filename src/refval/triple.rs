// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::claims::*;
use super::environment::Environment;
use super::measurement::Measurement;
use crate::errors::Error;
use bitmask::*;
use std::collections::BTreeSet;

bitmask! {
    #[derive(Debug)]
    mask ClaimsSet: u16 where flags Claims {
        Version          = 0x0001,
        GuestSvn         = 0x0002,
        Policy           = 0x0004,
        FamilyId         = 0x0008,
        ImageId          = 0x0010,
        Vmpl             = 0x0020,
        CurrentTcb       = 0x0040,
        PlatformInfo     = 0x0080,
        Measurement      = 0x0100,
        ReportedTcb      = 0x0200,
        CommittedTcb     = 0x0400,
        CurrentVersion   = 0x0800,
        CommittedVersion = 0x1000,
        LaunchTcb        = 0x2000,
    }
}

fn mandatory_claim(key: u64) -> Option<Claims> {
    match key {
        MKEY_VERSION => Some(Claims::Version),
        MKEY_GUEST_SVN => Some(Claims::GuestSvn),
        MKEY_POLICY => Some(Claims::Policy),
        MKEY_FAMILY_ID => Some(Claims::FamilyId),
        MKEY_IMAGE_ID => Some(Claims::ImageId),
        MKEY_VMPL => Some(Claims::Vmpl),
        MKEY_CURRENT_TCB => Some(Claims::CurrentTcb),
        MKEY_PLATFORM_INFO => Some(Claims::PlatformInfo),
        MKEY_MEASUREMENT => Some(Claims::Measurement),
        MKEY_REPORTED_TCB => Some(Claims::ReportedTcb),
        MKEY_COMMITTED_TCB => Some(Claims::CommittedTcb),
        MKEY_CURRENT_VERSION => Some(Claims::CurrentVersion),
        MKEY_COMMITTED_VERSION => Some(Claims::CommittedVersion),
        MKEY_LAUNCH_TCB => Some(Claims::LaunchTcb),
        _ => None,
    }
}

/// An environment and the reference values it is expected to exhibit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueTriple {
    pub environment: Environment,
    pub measurements: Vec<Measurement>,
}

impl ValueTriple {
    pub fn new(environment: Environment, measurements: Vec<Measurement>) -> Self {
        Self {
            environment,
            measurements,
        }
    }

    pub fn get(&self, key: u64) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.key == key)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.measurements.is_empty() {
            return Err(Error::Validation("no measurements".to_string()));
        }

        if let Some(i) = &self.environment.instance {
            if i.is_empty() {
                return Err(Error::Validation("empty instance identifier".to_string()));
            }
        }

        let mut seen = BTreeSet::new();
        let mut claims_set = ClaimsSet::none();

        for m in self.measurements.iter() {
            if !seen.insert(m.key) {
                return Err(Error::Validation(format!(
                    "duplicated measurement key {}",
                    m.key
                )));
            }

            if let Some(c) = mandatory_claim(m.key) {
                claims_set.set(c);
            }
        }

        for key in mandatory_keys() {
            // every key returned by mandatory_keys() has a flag
            let Some(c) = mandatory_claim(key) else {
                continue;
            };

            if !claims_set.contains(c) {
                return Err(Error::Validation(format!(
                    "missing measurement {} ({})",
                    key,
                    claim_name(key).unwrap_or("unknown")
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refval::{map_report, ClassId, MeasurementValue, Svn};
    use crate::report::AttestationReport;

    fn triple() -> ValueTriple {
        ValueTriple::new(
            Environment {
                class: ClassId::ByChip,
                instance: None,
            },
            map_report(&AttestationReport::new(), &[0u8; 48]),
        )
    }

    #[test]
    fn every_mandatory_key_has_a_flag() {
        for key in mandatory_keys() {
            assert!(mandatory_claim(key).is_some(), "{key}");
        }
    }

    #[test]
    fn triple_ok() {
        triple().validate().expect("valid triple");
    }

    #[test]
    fn triple_bad_empty() {
        let mut t = triple();
        t.measurements.clear();

        assert!(matches!(t.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn triple_bad_duplicated_key() {
        let mut t = triple();
        t.measurements
            .push(Measurement::new(MKEY_GUEST_SVN, MeasurementValue::Svn(Svn::Min(1))));

        assert!(matches!(t.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn triple_bad_missing_launch_digest() {
        let mut t = triple();
        t.measurements.retain(|m| m.key != MKEY_MEASUREMENT);

        match t.validate() {
            Err(Error::Validation(e)) => assert!(e.contains("measurement"), "{e}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn triple_bad_empty_instance() {
        let mut t = triple();
        t.environment.instance = Some(vec![]);

        assert!(matches!(t.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn lookup_by_key() {
        let t = triple();

        assert!(t.get(MKEY_LAUNCH_TCB).is_some());
        assert!(t.get(MKEY_CHIP_ID).is_none());
    }
}
