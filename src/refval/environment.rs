// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use crate::errors::Error;
use crate::report::{SIGNER_VCEK, SIGNER_VLEK};
use std::fmt;

const CLASS_ID_BY_CHIP: &str = "1.3.6.1.4.1.3704.3.1";
const CLASS_ID_BY_CSP: &str = "1.3.6.1.4.1.3704.3.2";

/// Who endorses the attesting environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassId {
    /// Reports signed with a chip-unique key (VCEK)
    ByChip,
    /// Reports signed with a cloud provider key (VLEK)
    ByCsp,
}

impl ClassId {
    pub fn oid(&self) -> &'static str {
        match self {
            ClassId::ByChip => CLASS_ID_BY_CHIP,
            ClassId::ByCsp => CLASS_ID_BY_CSP,
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.oid())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    pub class: ClassId,
    pub instance: Option<Vec<u8>>,
}

impl Environment {
    /// Derive the environment identity from the report signer.  A chip
    /// endorsed environment is bound to the CHIP_ID unless the firmware
    /// masked it; a CSP endorsed one is bound to the configured CSP
    /// identifier, if any.
    pub fn resolve(
        signer_info: u32,
        chip_id: &[u8],
        csp_id: Option<&str>,
    ) -> Result<Environment, Error> {
        match signer_info {
            SIGNER_VCEK => Ok(Environment {
                class: ClassId::ByChip,
                instance: (!is_all_zeros(chip_id)).then(|| chip_id.to_vec()),
            }),
            SIGNER_VLEK => Ok(Environment {
                class: ClassId::ByCsp,
                instance: csp_id.map(|id| id.as_bytes().to_vec()),
            }),
            other => Err(Error::UnsupportedSignerInfo(other)),
        }
    }
}

pub(crate) fn is_all_zeros(buf: &[u8]) -> bool {
    buf.iter().all(|b| *b == 0)
}
