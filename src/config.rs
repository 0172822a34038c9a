// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use crate::errors::Error;
use crate::measure::VmmType;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

/// A vCPU topology for which reference values are generated
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Topology {
    /// Use the launch digest found in the report as-is
    Report,
    /// Recompute the launch digest for a guest with this many vCPUs
    Vcpus(NonZeroU32),
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Report => f.write_str("report"),
            Topology::Vcpus(n) => write!(f, "{n} vCPU"),
        }
    }
}

/// Guest VM / TEE description.  Keys are matched in their documented
/// spelling or all lowercase; any other key is an error.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Reference values are generated for 1 to `maxvcpus` vCPUs
    #[serde(rename = "maxvcpus")]
    pub max_vcpus: u32,

    /// Instance identifier for CSP (VLEK) signed reports
    #[serde(rename = "cspId", alias = "cspid", default)]
    pub csp_id: Option<String>,

    /// vCPU model name, e.g. "EPYC-v4"
    #[serde(default)]
    pub model: Option<String>,

    /// Also emit the launch digest carried by the report, ahead of the
    /// recomputed ones
    #[serde(
        rename = "useReportMeasurement",
        alias = "usereportmeasurement",
        default
    )]
    pub use_report_measurement: bool,

    #[serde(default)]
    pub vmm: VmmType,
}

impl Config {
    /// Load the configuration from a YAML, TOML or JSON file, depending on
    /// the file extension (JSON when unknown)
    pub fn load(path: &Path) -> Result<Config, Error> {
        let s = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Config::parse_yaml(&s),
            Some("toml") => Config::parse_toml(&s),
            _ => Config::parse_json(&s),
        }
    }

    pub fn parse_yaml(y: &str) -> Result<Config, Error> {
        let c: Config = serde_yaml::from_str(y).map_err(|e| Error::Config(e.to_string()))?;
        c.validate()?;
        Ok(c)
    }

    pub fn parse_json(j: &str) -> Result<Config, Error> {
        let c: Config = serde_json::from_str(j).map_err(|e| Error::Config(e.to_string()))?;
        c.validate()?;
        Ok(c)
    }

    pub fn parse_toml(t: &str) -> Result<Config, Error> {
        let c: Config = toml::from_str(t).map_err(|e| Error::Config(e.to_string()))?;
        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.max_vcpus == 0 {
            return Err(Error::Config("maxvcpus must be at least 1".to_string()));
        }

        if self.csp_id.as_deref() == Some("") {
            return Err(Error::Config("cspId must not be empty".to_string()));
        }

        // every vCPU topology needs a model for the VMSA
        match self.model.as_deref() {
            None | Some("") => Err(Error::Config("model is required".to_string())),
            Some(_) => Ok(()),
        }
    }

    /// Topologies to evaluate, in ascending order
    pub fn topologies(&self) -> Vec<Topology> {
        let report = self.use_report_measurement.then_some(Topology::Report);

        report
            .into_iter()
            .chain((1..=self.max_vcpus).filter_map(NonZeroU32::new).map(Topology::Vcpus))
            .collect()
    }
}
