// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

/// Version numbering schemes, with their CoSWID registry values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionScheme {
    Decimal,
    SemVer,
}

impl VersionScheme {
    pub fn code(&self) -> u64 {
        match self {
            VersionScheme::Decimal => 4,
            VersionScheme::SemVer => 16384,
        }
    }
}

/// Named Information hash algorithm registry entries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlg {
    Sha384,
}

impl HashAlg {
    pub fn code(&self) -> u64 {
        match self {
            HashAlg::Sha384 => 7,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Svn {
    /// The evidence must carry exactly this SVN
    Exact(u64),
    /// The evidence must carry this SVN or a later one
    Min(u64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeasurementValue {
    Version {
        version: String,
        scheme: VersionScheme,
    },
    Svn(Svn),
    RawBytes(Vec<u8>),
    Digest {
        alg: HashAlg,
        value: Vec<u8>,
    },
}

/// A reference value for one report field, identified by its measurement key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Measurement {
    pub key: u64,
    pub value: MeasurementValue,
}

impl Measurement {
    pub fn new(key: u64, value: MeasurementValue) -> Self {
        Self { key, value }
    }
}
