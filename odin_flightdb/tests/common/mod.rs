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

//! synthetic flights for the integration tests

use std::{sync::Arc, time::Duration};
use chrono::{DateTime, Utc};
use odin_flightdb::{DataSystem, FlightDb, FlightDbConfig, MemoryStore, TrackFragment, Trackpoint};

pub const T0: i64 = 1483403847;

const METERS_PER_DEG: f64 = 111_195.0;

pub fn ts (secs: i64)->DateTime<Utc> {
    DateTime::from_timestamp( secs, 0).expect("valid epoch")
}

/// constant velocity track along a parallel, so interpolation between samples is accurate to meters
#[derive(Debug,Clone,Copy)]
pub struct StraightPath {
    pub t0: i64,
    pub lat0: f64,
    pub lon0: f64,
    pub speed_kn: f64,
}

impl StraightPath {
    /// eastbound
    pub fn new (t0: i64, lat0: f64, lon0: f64, speed_kn: f64)->Self {
        StraightPath { t0, lat0, lon0, speed_kn }
    }

    pub fn lon_rate (&self)->f64 { // deg/s
        let mps = self.speed_kn * 1852.0 / 3600.0;
        mps / (METERS_PER_DEG * self.lat0.to_radians().cos())
    }

    pub fn point (&self, t: i64)->Trackpoint {
        let lon = self.lon0 + self.lon_rate() * (t - self.t0) as f64;
        Trackpoint::new( "ADSB", "rx-1", ts(t), self.lat0, lon, 35000.0).with_velocity( self.speed_kn, 90.0, 0.0)
    }

    pub fn points (&self, times: &[i64])->Vec<Trackpoint> {
        times.iter().map( |t| self.point(*t)).collect()
    }

    /// a fragment with points every `step` seconds in [start,end]
    pub fn fragment (&self, icao: &str, start: i64, end: i64, step: i64)->TrackFragment {
        let times: Vec<i64> = (start..=end).step_by( step as usize).collect();
        TrackFragment::new( icao, "", DataSystem::ADSB, self.points( &times))
    }
}

pub fn test_config ()->FlightDbConfig {
    FlightDbConfig {
        lock_timeout: Duration::from_secs(10),
        retry_delay: Duration::from_millis(10),
        ..FlightDbConfig::default()
    }
}

pub fn new_db ()->(Arc<MemoryStore>,FlightDb) {
    let store = Arc::new( MemoryStore::new());
    let db = FlightDb::new( store.clone(), test_config());
    (store, db)
}

/// split the points into `n` consecutive fragments of (almost) equal size, reversing every third
/// one to simulate out of order delivery within a fragment
pub fn split_fragments (icao: &str, callsign: &str, points: &[Trackpoint], n: usize)->Vec<TrackFragment> {
    let base = points.len() / n;
    let extra = points.len() % n;
    let mut frags = Vec::with_capacity(n);
    let mut i0 = 0;

    for i in 0..n {
        let len = base + if i < extra { 1 } else { 0 };
        let mut track: Vec<Trackpoint> = points[i0..i0+len].to_vec();
        if i % 3 == 2 { track.reverse(); }
        frags.push( TrackFragment::new( icao, callsign, DataSystem::ADSB, track));
        i0 += len;
    }
    frags
}

/// deterministic scrambling of indices 0..n, `step` has to be coprime with n
pub fn permuted<T: Clone> (items: &[T], step: usize)->Vec<T> {
    let n = items.len();
    (0..n).map( |i| items[(i*step) % n].clone()).collect()
}
