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

use odin_flightdb::{IdSpec, OdinFlightDbError, TimeSpan};

mod common;
use common::ts;

/// run with "cargo test --test test_idspec -- --nocapture"

#[test]
fn test_round_trip () {
    for s in ["A5BB1B@1483403847:1483407465", "ABCDEF@0:0", "000001@5:10", "00A1F0@1483403847:1483403847"] {
        let spec = IdSpec::parse(s).unwrap();
        println!("{s} -> {spec:?}");
        assert_eq!( spec.to_string(), s);
    }

    let spec: IdSpec = "A5BB1B@1483403847:1483407465".parse().unwrap();
    assert_eq!( spec.icao(), "A5BB1B");
    assert_eq!( spec.start(), 1483403847);
    assert_eq!( spec.end(), 1483407465);
    assert_eq!( spec.duration_secs(), 3618);
}

#[test]
fn test_normalization () {
    let spec = IdSpec::parse("a5bb1b@10:20").unwrap();
    assert_eq!( spec.to_string(), "A5BB1B@10:20");

    let spec = IdSpec::parse("A5BB1B@42").unwrap();
    assert_eq!( spec.to_string(), "A5BB1B@42:42");

    // short addresses are zero padded so that they key the same flights as their 6 digit form
    let spec = IdSpec::parse("5bb1b@1:2").unwrap();
    assert_eq!( spec.to_string(), "05BB1B@1:2");
    assert_eq!( spec, IdSpec::parse("05BB1B@1:2").unwrap());
    assert_eq!( IdSpec::parse("1@5:10").unwrap().icao(), "000001");
    assert_eq!( IdSpec::key_prefix(" 5bb1b"), "05BB1B@");
}

#[test]
fn test_malformed () {
    for s in ["", "A5BB1B", "XYZ123@1:2", "A5BB1B7@1:2", "@1:2", "A5BB1B@2:1", "A5BB1B@a:2", "A5BB1B@1:", "A5BB1B@-1:2", "A5BB1B@01:2", "A5BB1B@1:2@3"] {
        let res = IdSpec::parse(s);
        println!("{s:?} -> {res:?}");
        assert!( matches!( res, Err(OdinFlightDbError::MalformedIdSpec(_))));
    }
}

#[test]
fn test_intersects () {
    let a = IdSpec::parse("A5BB1B@100:200").unwrap();
    assert!( a.intersects( &IdSpec::parse("A5BB1B@200:300").unwrap())); // inclusive
    assert!( a.intersects( &IdSpec::parse("A5BB1B@120:130").unwrap()));
    assert!( !a.intersects( &IdSpec::parse("A5BB1B@201:300").unwrap()));
    assert!( !a.intersects( &IdSpec::parse("A5BB1C@100:200").unwrap()));
    assert!( a.contains(100) && a.contains(200) && !a.contains(201));
}

#[test]
fn test_from_span () {
    let span = TimeSpan::new( ts(1000), ts(2000) + chrono::TimeDelta::milliseconds(1));
    let spec = IdSpec::from_span( "a5bb1b", &span).unwrap();
    assert_eq!( spec.to_string(), "A5BB1B@1000:2001"); // end rounded up
}

#[test]
fn test_serde () {
    let spec = IdSpec::parse("A5BB1B@1483403847:1483407465").unwrap();
    let json = serde_json::to_string( &spec).unwrap();
    assert_eq!( json, "\"A5BB1B@1483403847:1483407465\"");
    let spec2: IdSpec = serde_json::from_str( &json).unwrap();
    assert_eq!( spec, spec2);
    assert!( serde_json::from_str::<IdSpec>("\"A5BB1B@2:1\"").is_err());
}

#[test]
fn test_ordering () {
    let mut specs: Vec<IdSpec> = ["B@1:2", "A@5:6", "A@1:9", "A@1:3"].iter().map( |s| IdSpec::parse(s).unwrap()).collect();
    specs.sort();
    let strs: Vec<String> = specs.iter().map( |s| s.to_string()).collect();
    assert_eq!( strs, vec!["00000A@1:3", "00000A@1:9", "00000A@5:6", "00000B@1:2"]);
}
