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

use chrono::TimeDelta;
use uom::si::{length::{meter,kilometer}, velocity::knot};
use odin_flightdb::{DataSystem, Flight, FlightDbConfig, PlausibilityEvaluator, Relation, TrackFragment, Trackpoint, Verdict};
use odin_flightdb::geo::{haversine_distance, implied_speed, position_at, seconds};
use odin_flightdb::plausibility::{Direction, Implausibility};

mod common;
use common::{ts, StraightPath, T0};

/// run with "cargo test --test test_plausibility -- --nocapture"

fn times (start: i64, end: i64, step: usize)->Vec<i64> { (start..=end).step_by(step).collect() }

fn flight (path: &StraightPath, start: i64, end: i64)->Flight {
    Flight::from_fragment( &path.fragment( "A5BB1B", start, end, 4)).unwrap()
}

#[test]
fn test_geo () {
    let d = haversine_distance( 37.0, -122.0, 38.0, -122.0);
    println!("1deg lat = {:.3}km", d.get::<kilometer>());
    assert!( (d.get::<kilometer>() - 111.195).abs() < 0.1);

    let d = haversine_distance( 0.0, 179.5, 0.0, -179.5);
    assert!( (d.get::<kilometer>() - 111.195).abs() < 0.1);

    let v = implied_speed( d, TimeDelta::zero());
    assert!( v.get::<knot>().is_infinite());

    let track = vec![
        Trackpoint::new( "ADSB", "", ts(T0), 10.0, 179.0, 0.0),
        Trackpoint::new( "ADSB", "", ts(T0+10), 11.0, -179.0, 0.0),
    ];
    let ip = position_at( &track, ts(T0+5)).unwrap();
    println!("interpolated across antimeridian: {ip:?}");
    assert!( (ip.lat - 10.5).abs() < 0.01); // great circle bulges slightly poleward
    assert!( (ip.lon.abs() - 180.0).abs() < 0.01);
    assert_eq!( ip.nearest_sample, TimeDelta::seconds(5));
    assert!( position_at( &track, ts(T0+11)).is_none());
}

#[test]
fn test_sub_millisecond_samples () {
    let t = ts(T0);
    let track = vec![
        Trackpoint::new( "ADSB", "", t, 37.0, -122.0, 0.0),
        Trackpoint::new( "MLAT", "", t + TimeDelta::microseconds(100), 37.001, -122.0, 0.0),
    ];
    assert_eq!( seconds( TimeDelta::microseconds(100)), 0.0001);

    let ip = position_at( &track, t + TimeDelta::microseconds(50)).unwrap();
    println!("interpolated between samples 100us apart: {ip:?}");
    assert!( ip.lat.is_finite() && ip.lon.is_finite());
    assert!( (ip.lat - 37.0005).abs() < 1e-6);
    assert_eq!( ip.nearest_sample, TimeDelta::microseconds(50));

    let d = haversine_distance( 37.0, -122.0, 37.001, -122.0);
    let v = implied_speed( d, TimeDelta::microseconds(100));
    assert!( v.get::<knot>().is_finite() && v.get::<knot>() > 0.0);
}

#[test]
fn test_extension_is_symmetric () {
    let eval = PlausibilityEvaluator::new( &FlightDbConfig::default());
    let path = StraightPath::new( T0, 37.0, -122.0, 450.0);
    let early = path.points( &times( T0, T0+100, 4));
    let late = path.points( &times( T0+104, T0+200, 4));

    let fwd = eval.evaluate( &late, &early);
    let bwd = eval.evaluate( &early, &late);
    println!("forward: {fwd}\nbackward: {bwd}");

    match (fwd, bwd) {
        (Relation::Extension{direction: d1, gap: g1, ..}, Relation::Extension{direction: d2, gap: g2, ..}) => {
            assert_eq!( d1, Direction::Forward);
            assert_eq!( d2, Direction::Backward);
            assert_eq!( g1, TimeDelta::seconds(4));
            assert_eq!( g1, g2);
        }
        other => panic!("expected two extensions, got {other:?}")
    }
}

#[test]
fn test_gap_bound () {
    let eval = PlausibilityEvaluator::new( &FlightDbConfig::default());
    let path = StraightPath::new( T0, 37.0, -122.0, 450.0);
    let early = path.points( &times( T0, T0+100, 4));

    // too long, even though the positions are consistent
    let late = path.points( &times( T0+100+700, T0+900, 4));
    let rel = eval.evaluate( &late, &early);
    println!("{rel}");
    assert!( matches!( rel, Relation::Implausible{ reason: Implausibility::GapTooLong(_) }));

    // short gap, but 1 degree north of where it should be
    let jumped = StraightPath::new( T0, 38.0, -122.0, 450.0);
    let late = jumped.points( &times( T0+160, T0+200, 4));
    let rel = eval.evaluate( &late, &early);
    println!("{rel}");
    assert!( matches!( rel, Relation::Implausible{ reason: Implausibility::ImpliedSpeed(_) }));
    assert!( !rel.is_plausible());

    // a long but plausible gap
    let late = path.points( &times( T0+500, T0+600, 4));
    assert!( matches!( eval.evaluate( &late, &early), Relation::Extension{..}));
}

#[test]
fn test_overlap_classification () {
    let eval = PlausibilityEvaluator::new( &FlightDbConfig::default());
    let path = StraightPath::new( T0, 37.0, -122.0, 450.0);
    let track = path.points( &times( T0, T0+200, 4));

    // another receiver sampling the same aircraft at different times with a small position offset
    let same = StraightPath::new( T0, 37.01, -122.0, 450.0).points( &times( T0+102, T0+302, 4));
    let rel = eval.evaluate( &same, &track);
    println!("{rel}");
    match rel {
        Relation::OverlapSame{overlap, separation} => {
            assert_eq!( overlap, TimeDelta::seconds(98));
            assert!( separation.get::<meter>() < 2000.0);
        }
        other => panic!("expected OverlapSame, got {other:?}")
    }

    // same time, same transponder address, but 100+km apart
    let distinct = StraightPath::new( T0, 38.0, -122.0, 450.0).points( &times( T0+50, T0+150, 4));
    let rel = eval.evaluate( &distinct, &track);
    println!("{rel}");
    assert!( matches!( rel, Relation::OverlapDistinct{..}));
    assert!( !rel.is_plausible());

    // exact redelivery
    assert!( matches!( eval.evaluate( &track, &track), Relation::OverlapSame{..}));
}

#[test]
fn test_candidate_ranking () {
    let eval = PlausibilityEvaluator::new( &FlightDbConfig::default());
    let path = StraightPath::new( T0, 37.0, -122.0, 450.0);
    let other = StraightPath::new( T0, 38.0, -122.0, 450.0);

    let candidates = vec![
        flight( &path, T0, T0+96),          // extension, gap 4s
        flight( &other, T0+100, T0+300),    // distinct
        flight( &path, T0+180, T0+400),     // overlap same
        flight( &path, T0+500, T0+600),     // extension, gap 300s
    ];
    let track = path.points( &times( T0+100, T0+200, 4));

    let ranked = eval.rank_candidates( &track, &candidates);
    for sc in &ranked { println!("{} : {}", candidates[sc.index], sc.relation); }
    let order: Vec<usize> = ranked.iter().map( |sc| sc.index).collect();
    assert_eq!( order, vec![2, 0, 3, 1]);

    match eval.best_match( &track, &candidates) {
        Verdict::Match(sc) => assert_eq!( sc.index, 2),
        Verdict::NoMatch => panic!("expected match")
    }

    assert_eq!( eval.best_match( &track, &candidates[1..2]), Verdict::NoMatch);
    assert_eq!( eval.best_match( &track, &[]), Verdict::NoMatch);
}
