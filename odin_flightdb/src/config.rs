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

use std::{fs, path::Path, time::Duration};
use chrono::TimeDelta;
use serde::{Serialize,Deserialize};
use uom::si::{f64::{Length,Velocity}, length::meter, velocity::knot};

use crate::errors::Result;

/// the tunables of fragment reconciliation. Defaults are what we use for ADS-B receiver
/// feeds (see configs/flightdb.ron)
#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct FlightDbConfig {
    pub max_gap: Duration, // max time between a flight and a fragment that extends it
    pub cruise_speed_kn: f64, // typical cruise ground speed
    pub speed_tolerance: f64, // factor over cruise speed we still accept as implied speed
    pub position_noise_m: f64, // distance slack before computing implied speeds
    pub overlap_tolerance_m: f64, // base separation at which time-overlapping tracks are still the same flight
    pub query_page_size: usize, // page size for store queries
    pub lock_timeout: Duration, // max wait for the per-aircraft critical section
    pub call_timeout: Duration, // deadline for the store operations of one call
    pub max_retries: usize, // for retrying ingestion
    pub retry_delay: Duration,
}

impl Default for FlightDbConfig {
    fn default()->Self {
        FlightDbConfig {
            max_gap: Duration::from_secs(600),
            cruise_speed_kn: 500.0,
            speed_tolerance: 2.5,
            position_noise_m: 2000.0,
            overlap_tolerance_m: 5000.0,
            query_page_size: 100,
            lock_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

impl FlightDbConfig {
    pub fn max_gap_delta (&self)->TimeDelta { TimeDelta::from_std( self.max_gap).unwrap_or( TimeDelta::MAX) }

    pub fn cruise_speed (&self)->Velocity { Velocity::new::<knot>( self.cruise_speed_kn) }

    /// the fastest implied ground speed we still consider physically plausible
    pub fn max_plausible_speed (&self)->Velocity { Velocity::new::<knot>( self.cruise_speed_kn * self.speed_tolerance) }

    pub fn position_noise (&self)->Length { Length::new::<meter>( self.position_noise_m) }

    pub fn overlap_tolerance (&self)->Length { Length::new::<meter>( self.overlap_tolerance_m) }
}

/// load a RON config file
pub fn load_config<P: AsRef<Path>> (path: P)->Result<FlightDbConfig> {
    let data = fs::read_to_string( path)?;
    Ok( ron::from_str( &data)? )
}
