// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use crate::{corim, measure, report};

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to read report: {0}")]
    ReportRead(String),
    #[error("Failed to parse report: {0}")]
    ReportParse(#[from] report::Error),
    #[error("Unsupported signer info: {0}")]
    UnsupportedSignerInfo(u32),
    #[error("Launch digest computation failed: {0}")]
    LaunchDigest(#[from] measure::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Encoding error: {0}")]
    Encoding(#[from] corim::Error),
    #[error("Write error: {0}")]
    Write(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(e) | Error::ReportRead(e) | Error::Validation(e) | Error::Write(e) => {
                write!(f, "{}", e)
            }
            Error::ReportParse(e) => write!(f, "{:?}", e),
            Error::UnsupportedSignerInfo(s) => write!(f, "signer info {}", s),
            Error::LaunchDigest(e) => write!(f, "{:?}", e),
            Error::Encoding(e) => write!(f, "{:?}", e),
        }
    }
}
