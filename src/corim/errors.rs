// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Invalid OID: {0}")]
    Oid(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Encoding(e) | Error::Oid(e) => {
                write!(f, "{}", e)
            }
        }
    }
}
