// Copyright 2024 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::encode::*;
use super::errors::Error;
use super::DocumentSink;
use crate::refval::ValueTriple;
use ciborium::Value;
use uuid::Uuid;

/// CoRIM profile for AMD SEV-SNP reference values
pub const PROFILE: &str = "http://amd.com/2024/snp-corim-profile";

const COMID_LANGUAGE: &str = "en-GB";

// corim-map
const CORIM_ID: u64 = 0;
const CORIM_TAGS: u64 = 1;
const CORIM_PROFILE: u64 = 3;
// concise-mid-tag
const COMID_LANGUAGE_KEY: u64 = 0;
const COMID_TAG_IDENTITY: u64 = 1;
const COMID_TRIPLES: u64 = 4;
// tag-identity-map
const TAG_ID: u64 = 0;
// triples-map
const REFERENCE_TRIPLES: u64 = 0;

#[derive(Clone, Debug)]
struct Comid {
    tag_id: Uuid,
    triple: ValueTriple,
}

impl Comid {
    fn to_value(&self) -> Result<Value, Error> {
        let triples = Value::Map(vec![(
            uint(REFERENCE_TRIPLES),
            Value::Array(vec![reference_triple(&self.triple)?]),
        )]);

        Ok(Value::Map(vec![
            (
                uint(COMID_LANGUAGE_KEY),
                Value::Text(COMID_LANGUAGE.to_string()),
            ),
            (
                uint(COMID_TAG_IDENTITY),
                Value::Map(vec![(
                    uint(TAG_ID),
                    Value::Bytes(self.tag_id.as_bytes().to_vec()),
                )]),
            ),
            (uint(COMID_TRIPLES), triples),
        ]))
    }
}

/// An unsigned CoRIM carrying one CoMID per appended reference value triple,
/// in append order
#[derive(Clone, Debug)]
pub struct Corim {
    id: Uuid,
    profile: String,
    comids: Vec<Comid>,
}

impl Corim {
    pub fn new(profile: &str, id: Uuid) -> Self {
        Self {
            id,
            profile: profile.to_string(),
            comids: Vec::new(),
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn len(&self) -> usize {
        self.comids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comids.is_empty()
    }

    /// Encode as a CBOR tagged-unsigned-corim-map
    pub fn to_cbor(&self) -> Result<Vec<u8>, Error> {
        if self.comids.is_empty() {
            return Err(Error::Encoding("no reference values to encode".to_string()));
        }

        let mut tags = Vec::with_capacity(self.comids.len());

        for c in self.comids.iter() {
            let comid = to_bytes(&c.to_value()?)?;
            tags.push(tagged(TAGGED_COMID, Value::Bytes(comid)));
        }

        let corim = Value::Map(vec![
            (uint(CORIM_ID), Value::Text(self.id.to_string())),
            (uint(CORIM_TAGS), Value::Array(tags)),
            (
                uint(CORIM_PROFILE),
                tagged(TAGGED_URI, Value::Text(self.profile.clone())),
            ),
        ]);

        to_bytes(&tagged(TAGGED_UNSIGNED_CORIM, corim))
    }
}

impl DocumentSink for Corim {
    fn append(&mut self, triple: ValueTriple) -> Result<(), Error> {
        self.comids.push(Comid {
            tag_id: Uuid::new_v4(),
            triple,
        });

        Ok(())
    }

    fn finalize(&self) -> Result<Vec<u8>, Error> {
        self.to_cbor()
    }
}
