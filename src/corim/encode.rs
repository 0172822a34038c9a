// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use crate::refval::{Environment, Measurement, MeasurementValue, Svn, ValueTriple};
use ciborium::Value;

pub(crate) const TAGGED_URI: u64 = 32;
pub(crate) const TAGGED_OID: u64 = 111;
pub(crate) const TAGGED_UNSIGNED_CORIM: u64 = 501;
pub(crate) const TAGGED_COMID: u64 = 506;
pub(crate) const TAGGED_SVN: u64 = 552;
pub(crate) const TAGGED_MIN_SVN: u64 = 553;
pub(crate) const TAGGED_BYTES: u64 = 560;

// environment-map
const ENV_CLASS: u64 = 0;
const ENV_INSTANCE: u64 = 1;
// class-map
const CLASS_ID: u64 = 0;
// measurement-map
const MEAS_MKEY: u64 = 0;
const MEAS_MVAL: u64 = 1;
// measurement-values-map
const MVAL_VERSION: u64 = 0;
const MVAL_SVN: u64 = 1;
const MVAL_DIGESTS: u64 = 2;
const MVAL_RAW_VALUE: u64 = 4;
// version-map
const VERSION_VERSION: u64 = 0;
const VERSION_SCHEME: u64 = 1;

pub(crate) fn uint(v: u64) -> Value {
    Value::Integer(v.into())
}

pub(crate) fn tagged(tag: u64, v: Value) -> Value {
    Value::Tag(tag, Box::new(v))
}

pub(crate) fn to_bytes(v: &Value) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(v, &mut buf).map_err(|e| Error::Encoding(format!("{e:?}")))?;
    Ok(buf)
}

/// BER encoding of the OID arcs, without tag and length
pub(crate) fn oid_to_der(oid: &str) -> Result<Vec<u8>, Error> {
    let arcs = oid
        .split('.')
        .map(|a| a.parse::<u64>())
        .collect::<Result<Vec<u64>, _>>()
        .map_err(|e| Error::Oid(format!("{oid}: {e}")))?;

    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return Err(Error::Oid(format!("{oid}: bad leading arcs")));
    }

    let first = arcs[0]
        .checked_mul(40)
        .and_then(|v| v.checked_add(arcs[1]))
        .ok_or_else(|| Error::Oid(format!("{oid}: arc overflow")))?;

    let mut der = Vec::new();

    push_base128(&mut der, first);
    for a in &arcs[2..] {
        push_base128(&mut der, *a);
    }

    Ok(der)
}

fn push_base128(out: &mut Vec<u8>, mut v: u64) {
    let mut tmp = vec![(v & 0x7f) as u8];
    v >>= 7;

    while v > 0 {
        tmp.push((v & 0x7f) as u8 | 0x80);
        v >>= 7;
    }

    tmp.reverse();
    out.extend(tmp);
}

pub(crate) fn environment(env: &Environment) -> Result<Value, Error> {
    let class = Value::Map(vec![(
        uint(CLASS_ID),
        tagged(TAGGED_OID, Value::Bytes(oid_to_der(env.class.oid())?)),
    )]);

    let mut m = vec![(uint(ENV_CLASS), class)];

    if let Some(i) = &env.instance {
        m.push((uint(ENV_INSTANCE), tagged(TAGGED_BYTES, Value::Bytes(i.clone()))));
    }

    Ok(Value::Map(m))
}

fn measurement_values(v: &MeasurementValue) -> Value {
    let entry = match v {
        MeasurementValue::Version { version, scheme } => (
            uint(MVAL_VERSION),
            Value::Map(vec![
                (uint(VERSION_VERSION), Value::Text(version.clone())),
                (uint(VERSION_SCHEME), uint(scheme.code())),
            ]),
        ),
        MeasurementValue::Svn(Svn::Exact(n)) => (uint(MVAL_SVN), tagged(TAGGED_SVN, uint(*n))),
        MeasurementValue::Svn(Svn::Min(n)) => (uint(MVAL_SVN), tagged(TAGGED_MIN_SVN, uint(*n))),
        MeasurementValue::RawBytes(b) => (
            uint(MVAL_RAW_VALUE),
            tagged(TAGGED_BYTES, Value::Bytes(b.clone())),
        ),
        MeasurementValue::Digest { alg, value } => (
            uint(MVAL_DIGESTS),
            Value::Array(vec![Value::Array(vec![
                uint(alg.code()),
                Value::Bytes(value.clone()),
            ])]),
        ),
    };

    Value::Map(vec![entry])
}

pub(crate) fn measurement(m: &Measurement) -> Value {
    Value::Map(vec![
        (uint(MEAS_MKEY), uint(m.key)),
        (uint(MEAS_MVAL), measurement_values(&m.value)),
    ])
}

/// reference-triple-record: [ environment-map, [ + measurement-map ] ]
pub(crate) fn reference_triple(t: &ValueTriple) -> Result<Value, Error> {
    Ok(Value::Array(vec![
        environment(&t.environment)?,
        Value::Array(t.measurements.iter().map(measurement).collect()),
    ]))
}
