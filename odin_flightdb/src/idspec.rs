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

use std::{fmt, str::FromStr};
use serde::{Serialize, Serializer, Deserialize, Deserializer, de};

use crate::errors::{Result, malformed_id_spec};
use crate::trackpoint::TimeSpan;

/// the canonical identity of a flight: `ICAO@start:end` with a 6 digit upper case hex ICAO address and
/// decimal epoch seconds. This is also the store key of the flight, which means it changes whenever
/// the flight track is extended.
///
/// The text format is user facing (shared links) and has to round trip:
/// ```
/// use odin_flightdb::idspec::IdSpec;
/// let s = "A5BB1B@1483403847:1483407465";
/// assert_eq!( IdSpec::parse(s).unwrap().to_string(), s);
/// ```
#[derive(Debug,Clone,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub struct IdSpec {
    icao: String,
    start: i64, // epoch seconds, inclusive
    end: i64,   // epoch seconds, inclusive
}

impl IdSpec {
    pub fn new (icao: &str, start: i64, end: i64)->Result<Self> {
        let icao = parse_icao(icao)?;
        if start > end {
            return Err( malformed_id_spec( format!("start {start} is after end {end}")))
        }
        Ok( IdSpec{ icao, start, end } )
    }

    /// the key for a track covering the given span: floor(start) and ceil(end) in epoch seconds
    pub fn from_span (icao: &str, span: &TimeSpan)->Result<Self> {
        IdSpec::new( icao, span.start_secs(), span.end_secs())
    }

    /// parse `ICAO@start:end`. The single epoch form `ICAO@t` is accepted as shorthand for `ICAO@t:t`
    pub fn parse (s: &str)->Result<Self> {
        let (icao, times) = s.split_once('@').ok_or_else( || malformed_id_spec( format!("'{s}' does not match <icao>@<start>:<end>")))?;
        if times.contains('@') {
            return Err( malformed_id_spec( format!("'{s}' has more than one '@'")))
        }

        let (start,end) = match times.split_once(':') {
            Some((s0,s1)) => (parse_epoch(s0)?, parse_epoch(s1)?),
            None => { let t = parse_epoch(times)?; (t,t) }
        };

        IdSpec::new( icao, start, end)
    }

    #[inline] pub fn icao (&self)->&str { self.icao.as_str() }
    #[inline] pub fn start (&self)->i64 { self.start }
    #[inline] pub fn end (&self)->i64 { self.end }

    /// the common key prefix of all flights for a given icao address
    pub fn key_prefix (icao: &str)->String { format!("{}@", normalize_icao(icao)) }

    /// same aircraft and (inclusive) overlapping time ranges
    pub fn intersects (&self, other: &IdSpec)->bool {
        self.icao == other.icao && self.intersects_range( other.start, other.end)
    }

    pub fn intersects_range (&self, start: i64, end: i64)->bool {
        self.start <= end && start <= self.end
    }

    pub fn contains (&self, t: i64)->bool { t >= self.start && t <= self.end }

    pub fn duration_secs (&self)->i64 { self.end - self.start }
}

/// canonical form of a 24bit icao address: upper case hex, zero padded to 6 digits. Does not
/// validate, use on addresses that were checked (or will be rejected by a lookup miss)
pub fn normalize_icao (icao: &str)->String {
    format!("{:0>6}", icao.trim().to_ascii_uppercase())
}

fn parse_icao (s: &str)->Result<String> {
    if s.is_empty() || s.len() > 6 {
        return Err( malformed_id_spec( format!("icao segment '{s}' is not a 24bit hex address")))
    }
    if !s.chars().all( |c| c.is_ascii_hexdigit()) {
        return Err( malformed_id_spec( format!("icao segment '{s}' is not valid hex")))
    }
    Ok( normalize_icao(s))
}

// only plain decimal digits, no sign and no leading zeros so that formatting reproduces the input
fn parse_epoch (s: &str)->Result<i64> {
    if s.is_empty() || !s.bytes().all( |b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0')) {
        return Err( malformed_id_spec( format!("'{s}' is not a decimal epoch")))
    }
    s.parse::<i64>().map_err( |e| malformed_id_spec( format!("'{s}' not parseable: {e}")))
}

impl fmt::Display for IdSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}@{}:{}", self.icao, self.start, self.end)
    }
}

impl FromStr for IdSpec {
    type Err = crate::errors::OdinFlightDbError;
    fn from_str (s: &str)->Result<Self> { IdSpec::parse(s) }
}

impl Serialize for IdSpec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> where S: Serializer {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IdSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error> where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        IdSpec::parse(&s).map_err( de::Error::custom)
    }
}
