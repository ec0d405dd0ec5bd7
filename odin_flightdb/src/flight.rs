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

use std::{cmp::Ordering, fmt};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize,Deserialize};
use serde_json::Value;

use crate::errors::{Result, StoreResult, StoreError, invalid_fragment};
use crate::idspec::IdSpec;
use crate::trackpoint::{DataSystem, TimeSpan, TrackFragment, Trackpoint, canonical_track, merge_tracks};

/// the reconciled record of one physical flight. The track is always canonical (time sorted, no
/// duplicates) and never empty, and the id_spec is always derived from the track span. Both are
/// private so that they can only change together
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Flight {
    pub icao_id: String,
    #[serde(default)]
    pub callsign: String,   // first non-empty callsign we saw, not authoritative
    #[serde(default)]
    pub data_system: DataSystem,
    id_spec: IdSpec,
    track: Vec<Trackpoint>,
    pub last_update: DateTime<Utc>,
}

impl Flight {
    pub fn from_fragment (frag: &TrackFragment)->Result<Flight> {
        frag.validate()?;
        Flight::from_parts( &frag.icao_key(), &frag.callsign, frag.data_system, frag.canonical_points())
    }

    fn from_parts (icao: &str, callsign: &str, data_system: DataSystem, track: Vec<Trackpoint>)->Result<Flight> {
        let span = TimeSpan::of_track( &track).ok_or_else( || invalid_fragment( format!("no trackpoints for {icao}")))?;
        let id_spec = IdSpec::from_span( icao, &span)?;

        Ok( Flight {
            icao_id: id_spec.icao().to_string(),
            callsign: callsign.trim().to_string(),
            data_system,
            id_spec,
            track,
            last_update: Utc::now()
        })
    }

    /// the canonical sorted and de-duplicated track
    pub fn any_track (&self)->&[Trackpoint] { self.track.as_slice() }

    pub fn id_spec (&self)->&IdSpec { &self.id_spec }

    pub fn id_spec_string (&self)->String { self.id_spec.to_string() }

    /// the store key, which is the formatted id_spec
    pub fn key (&self)->String { self.id_spec.to_string() }

    pub fn len (&self)->usize { self.track.len() }

    pub fn time_span (&self)->TimeSpan {
        // the track is never empty
        TimeSpan::new( self.track[0].timestamp, self.track[self.track.len()-1].timestamp)
    }

    pub fn times (&self)->(DateTime<Utc>,DateTime<Utc>) {
        let span = self.time_span();
        (span.start, span.end)
    }

    pub fn duration (&self)->TimeDelta { self.time_span().duration() }

    /// does the track already have all the given points (or duplicates of them)
    pub fn contains_all (&self, points: &[Trackpoint])->bool {
        points.iter().all( |p| {
            let i = self.track.partition_point( |q| q.timestamp < p.timestamp);
            self.track[i..].iter().take_while( |q| q.timestamp == p.timestamp).any( |q| q.is_duplicate_of(p))
        })
    }

    /// a new flight value that combines our track with the given points. The id_spec is re-computed,
    /// i.e. the result might have a different key
    pub fn merged_with (&self, points: &[Trackpoint], callsign: &str, data_system: DataSystem)->Result<Flight> {
        let track = merge_tracks( &self.track, points);
        let callsign = if self.callsign.is_empty() { callsign } else { self.callsign.as_str() };
        let data_system = if self.data_system == DataSystem::Unknown { data_system } else { self.data_system };

        Flight::from_parts( &self.icao_id, callsign, data_system, track)
    }

    pub fn to_document (&self)->StoreResult<Value> {
        Ok( serde_json::to_value(self)? )
    }

    pub fn from_document (doc: Value)->StoreResult<Flight> {
        let flight: Flight = serde_json::from_value(doc)?;
        flight.check_consistency()?;
        Ok(flight)
    }

    /// all flights stored under one key. Distinct flights of the same aircraft can have the same
    /// span (and hence key), in which case the document is an array of flights instead of a
    /// single one
    pub fn flights_from_document (doc: Value)->StoreResult<Vec<Flight>> {
        match doc {
            Value::Array(docs) => {
                if docs.is_empty() {
                    return Err( doc_error( "empty flight list".to_string()))
                }
                docs.into_iter().map( Flight::from_document).collect()
            }
            doc => Ok( vec![ Flight::from_document(doc)? ])
        }
    }

    pub fn flights_to_document (flights: &[Flight])->StoreResult<Value> {
        match flights {
            [flight] => flight.to_document(),
            _ => Ok( Value::Array( flights.iter().map( |f| f.to_document()).collect::<StoreResult<Vec<Value>>>()? ))
        }
    }

    /// total order for result lists: by id_spec, co-keyed flights by their first trackpoint
    pub fn canonical_cmp (&self, other: &Flight)->Ordering {
        self.id_spec.cmp( &other.id_spec)
            .then_with( || match (self.track.first(), other.track.first()) {
                (Some(a), Some(b)) => a.canonical_cmp(b),
                _ => self.track.len().cmp( &other.track.len())
            })
    }

    fn check_consistency (&self)->StoreResult<()> {
        if self.track.is_empty() {
            return Err( doc_error( format!("flight {} without track", self.id_spec)))
        }
        let span = self.time_span();
        if span.start_secs() != self.id_spec.start() || span.end_secs() != self.id_spec.end() {
            return Err( doc_error( format!("flight {} has stale id_spec for track span {}", self.id_spec, span)))
        }
        if self.track.windows(2).any( |w| w[0].timestamp > w[1].timestamp) {
            return Err( doc_error( format!("flight {} has unsorted track", self.id_spec)))
        }
        Ok(())
    }
}

fn doc_error (msg: String)->StoreError {
    StoreError::Codec( <serde_json::Error as serde::de::Error>::custom(msg))
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Flight( {}", self.id_spec)?;
        if !self.callsign.is_empty() { write!( f, ", cs: \"{}\"", self.callsign)?; }
        write!( f, ", ds: {}, n_pts: {}, span: {} )", self.data_system, self.track.len(), self.time_span())
    }
}
