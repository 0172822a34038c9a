// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Firmware error: {0}")]
    Firmware(String),
    #[error("Unsupported CPU model: {0}")]
    Model(String),
    #[error("Digest error: {0}")]
    Digest(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Firmware(e) | Error::Model(e) | Error::Digest(e) => {
                write!(f, "{}", e)
            }
        }
    }
}
