/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use std::sync::Arc;
use serde::{Serialize,Deserialize};
use sha2::{Digest, Sha256};

use crate::errors::{Result, OdinFlightDbError};
use crate::idspec::IdSpec;
use crate::store::FlightStore;

pub const ID_SPEC_SET_PREFIX: &str = "IdSpecSet/";

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
struct IdSpecSet {
    id_specs: Vec<String>,
}

/// shareable named lists of flights (e.g. for links to a multi-flight view). Sets live in the
/// flight store under their own key prefix, and the key is derived from the content so saving
/// the same list twice yields the same key
pub struct IdSpecSetStore {
    store: Arc<dyn FlightStore>,
}

impl IdSpecSetStore {
    pub fn new (store: Arc<dyn FlightStore>)->Self {
        IdSpecSetStore { store }
    }

    /// store the list (in the given order) and return its key. All entries have to be well formed
    /// IdSpecs, they are saved in normalized form
    pub async fn save (&self, id_specs: &[String])->Result<String> {
        let id_specs: Vec<String> = id_specs.iter()
            .map( |s| IdSpec::parse(s).map( |spec| spec.to_string()))
            .collect::<Result<Vec<String>>>()?;

        let key = set_key( &id_specs);
        let doc = serde_json::to_value( &IdSpecSet{ id_specs }).map_err( |e| OdinFlightDbError::StoreUnavailable(e.to_string()))?;
        self.store.put( &key, doc).await?;
        Ok(key)
    }

    pub async fn load (&self, key: &str)->Result<Vec<String>> {
        if !key.starts_with( ID_SPEC_SET_PREFIX) {
            return Err( OdinFlightDbError::NotFound( format!("not an IdSpecSet key: {key}")))
        }

        match self.store.get( key).await? {
            Some(doc) => {
                let set: IdSpecSet = serde_json::from_value(doc).map_err( |e| OdinFlightDbError::StoreUnavailable(e.to_string()))?;
                Ok( set.id_specs)
            }
            None => Err( OdinFlightDbError::NotFound( key.to_string()))
        }
    }
}

fn set_key (id_specs: &[String])->String {
    let mut hasher = Sha256::new();
    for s in id_specs {
        hasher.update( s.as_bytes());
        hasher.update( b"\n");
    }
    let digest = hasher.finalize();
    format!("{}{}", ID_SPEC_SET_PREFIX, hex::encode( &digest[..12]))
}
