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

//! the (few) spherical computations we need to reason about track plausibility. Accuracy
//! requirements are low - we compare against tolerances in the kilometer range

use chrono::{DateTime, TimeDelta, Utc};
use geo::algorithm::line_measures::metric_spaces::Haversine;
use geo::{Distance, InterpolatePoint, Point};
use uom::si::{f64::{Length,Velocity}, length::meter, velocity::meter_per_second};

use crate::trackpoint::Trackpoint;

/// fractional seconds of a time delta. Stays exact for sub-millisecond deltas
pub fn seconds (dt: TimeDelta)->f64 {
    match dt.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => dt.num_milliseconds() as f64 / 1000.0 // only overflows for deltas > 290k years
    }
}

pub fn haversine_distance (lat1: f64, lon1: f64, lat2: f64, lon2: f64)->Length {
    let dist = Haversine.distance( Point::new(lon1,lat1), Point::new(lon2,lat2));
    Length::new::<meter>(dist)
}

pub fn distance_between (a: &Trackpoint, b: &Trackpoint)->Length {
    haversine_distance( a.lat, a.lon, b.lat, b.lon)
}

/// average ground speed required to cover `dist` in `dt`. A zero (or negative) time delta makes any
/// non-zero distance infinitely fast
pub fn implied_speed (dist: Length, dt: TimeDelta)->Velocity {
    let secs = seconds(dt);
    let d = dist.get::<meter>();
    if secs > 0.0 {
        Velocity::new::<meter_per_second>( d / secs)
    } else if d > 0.0 {
        Velocity::new::<meter_per_second>( f64::INFINITY)
    } else {
        Velocity::new::<meter_per_second>( 0.0)
    }
}

/// a position estimated from the samples of a track
#[derive(Debug,Clone,Copy)]
pub struct InterpolatedPosition {
    pub lat: f64,
    pub lon: f64,
    pub nearest_sample: TimeDelta, // how far away in time the closest real sample is
}

/// great circle interpolation of the position of a (canonical, time sorted) track at a given time.
/// Returns None if `t` is outside of the track span
pub fn position_at (track: &[Trackpoint], t: DateTime<Utc>)->Option<InterpolatedPosition> {
    let first = track.first()?;
    let last = track.last()?;
    if t < first.timestamp || t > last.timestamp { return None }

    let i = track.partition_point( |p| p.timestamp < t);
    let post = &track[i];
    if post.timestamp == t || i == 0 {
        return Some( InterpolatedPosition{ lat: post.lat, lon: post.lon, nearest_sample: TimeDelta::zero() })
    }
    let pre = &track[i-1];

    let dt_pre = t - pre.timestamp;
    let dt_post = post.timestamp - t;
    let total = seconds( post.timestamp - pre.timestamp);
    if total <= 0.0 {
        return Some( InterpolatedPosition{ lat: pre.lat, lon: pre.lon, nearest_sample: TimeDelta::zero() })
    }
    let ratio = (seconds(dt_pre) / total).clamp( 0.0, 1.0);

    let p = Haversine.point_at_ratio_between( Point::new(pre.lon,pre.lat), Point::new(post.lon,post.lat), ratio);

    Some( InterpolatedPosition {
        lat: p.y(),
        lon: p.x(),
        nearest_sample: dt_pre.min(dt_post)
    })
}
