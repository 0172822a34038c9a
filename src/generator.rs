// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Reference value generation: for every configured [`Topology`], obtain the
//! expected launch digest, map the report onto measurements, and hand the
//! resulting triple to a [`DocumentSink`].
//!
//! # Example
//!
//! ```
//! use snp_refval::config::Config;
//! use snp_refval::corim::{Corim, DocumentSink, PROFILE};
//! use snp_refval::generator::{generate, Context};
//! use snp_refval::measure::{Error, LaunchDigester, LaunchParams};
//! use snp_refval::report::AttestationReport;
//!
//! struct Fixed;
//!
//! impl LaunchDigester for Fixed {
//!     fn launch_digest(&mut self, p: &LaunchParams) -> Result<Vec<u8>, Error> {
//!         Ok(vec![p.vcpus as u8; 48])
//!     }
//! }
//!
//! let report = AttestationReport { version: 2, ..Default::default() };
//! let config = Config::parse_json(r#"{"maxvcpus": 2, "model": "EPYC-v4"}"#).unwrap();
//!
//! let mut corim = Corim::new(PROFILE, uuid::Uuid::new_v4());
//! let n = generate(&Context::new(&report, &config), &mut Fixed, &mut corim).unwrap();
//!
//! assert_eq!(n, 2);
//! let cbor = corim.finalize().unwrap();
//! ```

use crate::config::{Config, Topology};
use crate::corim::DocumentSink;
use crate::errors::Error;
use crate::measure::{LaunchDigester, LaunchParams, GUEST_FEATURES};
use crate::refval::{map_report, Environment, ValueTriple};
use crate::report::AttestationReport;
use tracing::{debug, info};

/// Everything the generation steps read.  Nothing in here changes while
/// topologies are evaluated.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    pub report: &'a AttestationReport,
    pub config: &'a Config,
}

impl<'a> Context<'a> {
    pub fn new(report: &'a AttestationReport, config: &'a Config) -> Self {
        Self { report, config }
    }
}

/// The expected launch digest of the guest for the given topology
pub fn launch_measurement(
    ctx: &Context,
    topology: Topology,
    digester: &mut impl LaunchDigester,
) -> Result<Vec<u8>, Error> {
    match topology {
        Topology::Report => Ok(ctx.report.measurement.to_vec()),
        Topology::Vcpus(n) => {
            let cpu_model = ctx
                .config
                .model
                .as_deref()
                .ok_or_else(|| Error::Config("model is required".to_string()))?;

            let params = LaunchParams {
                vcpus: n.get(),
                guest_features: GUEST_FEATURES,
                vmm: ctx.config.vmm,
                cpu_model,
            };

            Ok(digester.launch_digest(&params)?)
        }
    }
}

/// Build and validate the reference value triple for one topology
pub fn reference_values(
    ctx: &Context,
    environment: &Environment,
    topology: Topology,
    digester: &mut impl LaunchDigester,
) -> Result<ValueTriple, Error> {
    let ld = launch_measurement(ctx, topology, digester)?;

    debug!(%topology, launch_digest = %hex::encode(&ld), "launch measurement");

    let triple = ValueTriple::new(environment.clone(), map_report(ctx.report, &ld));
    triple.validate()?;

    Ok(triple)
}

/// Append one triple per configured topology to `sink`, in ascending
/// topology order.  Returns the number of triples appended.  Any failure
/// aborts the run; the sink should then be discarded.
pub fn generate(
    ctx: &Context,
    digester: &mut impl LaunchDigester,
    sink: &mut impl DocumentSink,
) -> Result<usize, Error> {
    let environment = Environment::resolve(
        ctx.report.signer_info(),
        &ctx.report.chip_id,
        ctx.config.csp_id.as_deref(),
    )?;

    info!(
        class = %environment.class,
        instance = environment.instance.is_some(),
        "resolved environment"
    );

    let mut n = 0;

    for topology in ctx.config.topologies() {
        let triple = reference_values(ctx, &environment, topology, digester)?;

        sink.append(triple)?;
        n += 1;

        info!(%topology, "reference values added");
    }

    Ok(n)
}
