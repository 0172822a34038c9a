// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use sev::firmware::host::TcbVersion;
use std::fmt;

/// A packed SEV-SNP TCB_VERSION.  The raw 64-bit value, in the layout of the
/// reporting CPU, is what gets asserted in reference values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tcb(pub u64);

impl Tcb {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<TcbVersion> for Tcb {
    fn from(t: TcbVersion) -> Self {
        // only Turin and later carry an FMC SVN
        let bytes = match t.fmc {
            Some(_) => t.to_turin_bytes(),
            None => t.to_legacy_bytes(),
        };

        Tcb(u64::from_le_bytes(bytes))
    }
}

impl fmt::Display for Tcb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_layout() {
        let t = Tcb::from(TcbVersion::new(None, 3, 0, 8, 115));

        assert_eq!(t, Tcb(u64::from_le_bytes([3, 0, 0, 0, 0, 0, 8, 115])));
        assert_eq!(t.to_string(), "0x7308000000000003");
    }

    #[test]
    fn turin_layout() {
        let t = Tcb::from(TcbVersion::new(Some(1), 3, 0, 8, 115));

        assert_eq!(t.raw(), u64::from_le_bytes([1, 3, 0, 8, 0, 0, 0, 115]));
    }
}
