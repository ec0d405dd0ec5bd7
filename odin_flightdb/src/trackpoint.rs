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

use crate::errors::{Result, invalid_fragment};
use crate::idspec::normalize_icao;

/// the pipeline that produced a fragment (or trackpoint)
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,Default)]
pub enum DataSystem {
    #[serde(rename="A")] ADSB,
    #[serde(rename="M")] MLAT,
    #[serde(rename="Z")] Radar,
    #[serde(rename="F")] CorrectedRadar,
    #[default]
    #[serde(rename="?")] Unknown,
}

impl fmt::Display for DataSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataSystem::ADSB => "A",
            DataSystem::MLAT => "M",
            DataSystem::Radar => "Z",
            DataSystem::CorrectedRadar => "F",
            DataSystem::Unknown => "?",
        };
        write!( f, "{s}")
    }
}

/// one positional sample of an aircraft. Units are the ones ADS-B reports in (ft, kn, ft/min)
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Trackpoint {
    pub source: String,         // data source network, e.g. "ADSB"
    #[serde(default)]
    pub receiver: String,       // receiving station
    pub timestamp: DateTime<Utc>,
    pub lat: f64,               // degrees
    pub lon: f64,               // degrees
    #[serde(default)]
    pub altitude: f64,          // pressure altitude in feet
    #[serde(default)]
    pub ground_speed: f64,      // knots
    #[serde(default)]
    pub heading: f64,           // degrees [0,360)
    #[serde(default)]
    pub vertical_rate: f64,     // feet per minute, signed
    #[serde(default)]
    pub squawk: String,         // 4 digit mode-A code, might be empty
}

impl Trackpoint {
    pub fn new (source: impl ToString, receiver: impl ToString, timestamp: DateTime<Utc>, lat: f64, lon: f64, altitude: f64)->Self {
        Trackpoint {
            source: source.to_string(),
            receiver: receiver.to_string(),
            timestamp, lat, lon, altitude,
            ground_speed: 0.0,
            heading: 0.0,
            vertical_rate: 0.0,
            squawk: String::new()
        }
    }

    pub fn with_velocity (mut self, ground_speed: f64, heading: f64, vertical_rate: f64)->Self {
        self.ground_speed = ground_speed;
        self.heading = heading;
        self.vertical_rate = vertical_rate;
        self
    }

    /// two points are duplicates if they share timestamp and position, no matter who received them
    pub fn is_duplicate_of (&self, other: &Trackpoint)->bool {
        self.timestamp == other.timestamp && self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
    }

    /// total order over all fields. Duplicates are adjacent in this order and the first one of each
    /// duplicate run is the same no matter in which order points were collected
    pub fn canonical_cmp (&self, other: &Trackpoint)->Ordering {
        self.timestamp.cmp(&other.timestamp)
            .then_with( || self.lat.total_cmp(&other.lat))
            .then_with( || self.lon.total_cmp(&other.lon))
            .then_with( || self.altitude.total_cmp(&other.altitude))
            .then_with( || self.ground_speed.total_cmp(&other.ground_speed))
            .then_with( || self.heading.total_cmp(&other.heading))
            .then_with( || self.vertical_rate.total_cmp(&other.vertical_rate))
            .then_with( || self.source.cmp(&other.source))
            .then_with( || self.receiver.cmp(&other.receiver))
            .then_with( || self.squawk.cmp(&other.squawk))
    }

    fn is_valid_position (&self)->bool {
        self.lat.is_finite() && self.lon.is_finite() && self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }
}

impl fmt::Display for Trackpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "[{}] ({:.5},{:.5}) {:.0}ft, {:.0}kts, {:.0}deg",
                self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"), self.lat, self.lon, self.altitude, self.ground_speed, self.heading)
    }
}

/* #region track ops ********************************************************************************/

/// sort by timestamp (using the canonical total order) and collapse duplicates
pub fn canonical_track (mut points: Vec<Trackpoint>)->Vec<Trackpoint> {
    points.sort_by( |a,b| a.canonical_cmp(b));
    points.dedup_by( |later,earlier| earlier.is_duplicate_of(later)); // keeps the earlier one
    points
}

/// union of two tracks in canonical form
pub fn merge_tracks (a: &[Trackpoint], b: &[Trackpoint])->Vec<Trackpoint> {
    let mut points = Vec::with_capacity( a.len() + b.len());
    points.extend_from_slice(a);
    points.extend_from_slice(b);
    canonical_track(points)
}

/// inclusive time interval covered by a track
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSpan {
    pub fn new (start: DateTime<Utc>, end: DateTime<Utc>)->Self {
        if start <= end { TimeSpan{start,end} } else { TimeSpan{start:end, end:start} }
    }

    /// works for unsorted tracks. None if there are no points
    pub fn of_track (track: &[Trackpoint])->Option<TimeSpan> {
        let mut it = track.iter();
        let first = it.next()?;
        let (start,end) = it.fold( (first.timestamp,first.timestamp), |(s,e),p| (s.min(p.timestamp), e.max(p.timestamp)));
        Some( TimeSpan{start,end})
    }

    pub fn duration (&self)->TimeDelta { self.end - self.start }

    pub fn contains (&self, t: DateTime<Utc>)->bool { t >= self.start && t <= self.end }

    pub fn overlaps (&self, other: &TimeSpan)->bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn overlap (&self, other: &TimeSpan)->Option<TimeSpan> {
        if self.overlaps(other) {
            Some( TimeSpan{ start: self.start.max(other.start), end: self.end.min(other.end) })
        } else {
            None
        }
    }

    /// time between the nearer edges, zero if overlapping
    pub fn gap_to (&self, other: &TimeSpan)->TimeDelta {
        if self.overlaps(other) {
            TimeDelta::zero()
        } else if other.start > self.end {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }

    /// saturates at the representable time range
    pub fn widened (&self, delta: TimeDelta)->TimeSpan {
        let start = self.start.checked_sub_signed(delta).unwrap_or( DateTime::<Utc>::MIN_UTC);
        let end = self.end.checked_add_signed(delta).unwrap_or( DateTime::<Utc>::MAX_UTC);
        TimeSpan{ start, end }
    }

    pub fn union (&self, other: &TimeSpan)->TimeSpan {
        TimeSpan{ start: self.start.min(other.start), end: self.end.max(other.end) }
    }

    /// epoch seconds, rounded down
    pub fn start_secs (&self)->i64 { self.start.timestamp_millis().div_euclid(1000) }

    /// epoch seconds, rounded up
    pub fn end_secs (&self)->i64 { (self.end.timestamp_millis() + 999).div_euclid(1000) }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "[{} .. {}]", self.start.format("%H:%M:%S%.3f"), self.end.format("%H:%M:%S%.3f"))
    }
}

/* #endregion track ops */

/* #region fragment *********************************************************************************/

/// a batch of trackpoints for one aircraft as delivered by the upstream bus. The track is in
/// arrival order, which is neither guaranteed to be chronological nor contiguous
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct TrackFragment {
    pub icao_id: String,
    #[serde(default)]
    pub callsign: String,   // not an identity signal, can change between fragments of the same flight
    #[serde(default)]
    pub data_system: DataSystem,
    pub track: Vec<Trackpoint>,
}

impl TrackFragment {
    pub fn new (icao_id: impl ToString, callsign: impl ToString, data_system: DataSystem, track: Vec<Trackpoint>)->Self {
        TrackFragment{ icao_id: icao_id.to_string(), callsign: callsign.to_string(), data_system, track }
    }

    /// check the fragment can be reconciled at all
    pub fn validate (&self)->Result<()> {
        let icao = self.icao_id.trim();
        if icao.is_empty() {
            return Err( invalid_fragment("empty icao id"))
        }
        if icao.len() > 6 || !icao.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err( invalid_fragment( format!("icao id '{}' is not a 24bit hex address", self.icao_id)))
        }
        if self.track.is_empty() {
            return Err( invalid_fragment( format!("fragment for {} has empty track", self.icao_id)))
        }
        if let Some(p) = self.track.iter().find( |p| !p.is_valid_position()) {
            return Err( invalid_fragment( format!("fragment for {} has invalid position {}", self.icao_id, p)))
        }
        Ok(())
    }

    /// normalized (upper case, 6 digit) icao id that is used as the grouping key
    pub fn icao_key (&self)->String { normalize_icao( &self.icao_id) }

    pub fn time_span (&self)->Option<TimeSpan> { TimeSpan::of_track( &self.track) }

    pub fn canonical_points (&self)->Vec<Trackpoint> { canonical_track( self.track.clone()) }

    /// name of the track within the flight it contributes to
    pub fn track_name (&self)->String {
        match self.data_system {
            DataSystem::ADSB => "ADSB".to_string(),
            DataSystem::MLAT => "MLAT".to_string(),
            ds => format!("t_{ds}")
        }
    }
}

impl fmt::Display for TrackFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "[{}/{}]{}", self.callsign, self.icao_id, self.track_name())?;
        if let Some(span) = self.time_span() {
            write!( f, " {} +{}s", span.start.format("%H:%M:%S UTC"), span.duration().num_seconds())?;
        }
        write!( f, " ({} points)", self.track.len())
    }
}

/* #endregion fragment */
