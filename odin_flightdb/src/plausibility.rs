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

//! decides if a track (usually a new fragment) belongs to an existing flight. This is pure
//! computation - all store access happens in the merge engine.
//!
//! We already know both tracks come from the same transponder address, so the question is only
//! if they can be the same physical flight:
//! - disjoint in time: the gap has to be short enough and must not imply an impossible speed
//!   between the two boundary positions (in either direction, arrival order does not matter)
//! - overlapping in time: positions at matching (interpolated) times have to agree within a
//!   tolerance, otherwise we have two simultaneous tracks for the same address

use std::{cmp::Ordering, fmt};
use chrono::TimeDelta;
use uom::si::{f64::{Length,Velocity}, length::{meter,kilometer}, velocity::{knot,meter_per_second}};

use crate::config::FlightDbConfig;
use crate::flight::Flight;
use crate::geo::{distance_between, haversine_distance, implied_speed, position_at, seconds};
use crate::trackpoint::{TimeSpan, Trackpoint};

/// where the evaluated track lies relative to the candidate
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Direction {
    Forward,  // track comes after candidate
    Backward, // track comes before candidate
}

#[derive(Debug,Clone,PartialEq)]
pub enum Implausibility {
    NoPoints,
    GapTooLong(TimeDelta),
    ImpliedSpeed(Velocity),
}

/// the relationship between a track and a candidate flight track
#[derive(Debug,Clone,PartialEq)]
pub enum Relation {
    Extension { direction: Direction, gap: TimeDelta, implied_speed: Velocity },
    OverlapSame { overlap: TimeDelta, separation: Length },
    OverlapDistinct { overlap: TimeDelta, separation: Length },
    Implausible { reason: Implausibility },
}

impl Relation {
    /// can the track be merged into the candidate
    pub fn is_plausible (&self)->bool {
        matches!( self, Relation::OverlapSame{..} | Relation::Extension{..})
    }

    /// lower is better
    pub fn rank (&self)->u8 {
        match self {
            Relation::OverlapSame{..} => 0,
            Relation::Extension{..} => 1,
            Relation::OverlapDistinct{..} => 2,
            Relation::Implausible{..} => 3,
        }
    }

    /// tie breaker within the same rank, lower is better (larger overlap, smaller gap)
    fn closeness (&self)->i64 {
        match self {
            Relation::OverlapSame{overlap,..} => -overlap.num_milliseconds(),
            Relation::Extension{gap,..} => gap.num_milliseconds(),
            _ => i64::MAX
        }
    }

    /// the total order in which candidates are preferred
    pub fn preference_cmp (&self, other: &Relation)->Ordering {
        self.rank().cmp( &other.rank()).then_with( || self.closeness().cmp( &other.closeness()))
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Extension{direction,gap,implied_speed} => {
                write!( f, "Extension( {:?}, gap: {}s, speed: {:.0}kn )", direction, gap.num_seconds(), implied_speed.get::<knot>())
            }
            Relation::OverlapSame{overlap,separation} => {
                write!( f, "OverlapSame( overlap: {}s, separation: {:.2}km )", overlap.num_seconds(), separation.get::<kilometer>())
            }
            Relation::OverlapDistinct{overlap,separation} => {
                write!( f, "OverlapDistinct( overlap: {}s, separation: {:.2}km )", overlap.num_seconds(), separation.get::<kilometer>())
            }
            Relation::Implausible{reason} => match reason {
                Implausibility::NoPoints => write!( f, "Implausible( no points )"),
                Implausibility::GapTooLong(gap) => write!( f, "Implausible( gap: {}s )", gap.num_seconds()),
                Implausibility::ImpliedSpeed(v) => write!( f, "Implausible( implied speed: {:.0}kn )", v.get::<knot>()),
            }
        }
    }
}

/// a candidate (by index into the evaluated candidate list) and how the track relates to it
#[derive(Debug,Clone,PartialEq)]
pub struct ScoredCandidate {
    pub index: usize,
    pub relation: Relation,
}

#[derive(Debug,Clone,PartialEq)]
pub enum Verdict {
    Match(ScoredCandidate),
    NoMatch,
}

#[derive(Debug,Clone)]
pub struct PlausibilityEvaluator {
    max_gap: TimeDelta,
    max_speed: Velocity,
    cruise_speed: Velocity,
    position_noise: Length,
    overlap_tolerance: Length,
}

impl PlausibilityEvaluator {
    pub fn new (config: &FlightDbConfig)->Self {
        PlausibilityEvaluator {
            max_gap: config.max_gap_delta(),
            max_speed: config.max_plausible_speed(),
            cruise_speed: config.cruise_speed(),
            position_noise: config.position_noise(),
            overlap_tolerance: config.overlap_tolerance(),
        }
    }

    pub fn max_gap (&self)->TimeDelta { self.max_gap }

    /// classify `track` against `candidate`. Both have to be canonical (time sorted)
    pub fn evaluate (&self, track: &[Trackpoint], candidate: &[Trackpoint])->Relation {
        let (Some(span), Some(cand_span)) = (TimeSpan::of_track(track), TimeSpan::of_track(candidate)) else {
            return Relation::Implausible{ reason: Implausibility::NoPoints }
        };

        if let Some(overlap) = span.overlap( &cand_span) {
            self.evaluate_overlap( track, candidate, &overlap)
        } else {
            self.evaluate_extension( track, &span, candidate, &cand_span)
        }
    }

    fn evaluate_extension (&self, track: &[Trackpoint], span: &TimeSpan, candidate: &[Trackpoint], cand_span: &TimeSpan)->Relation {
        let (direction, gap, p_from, p_to) = if span.start > cand_span.end {
            (Direction::Forward, span.start - cand_span.end, &candidate[candidate.len()-1], &track[0])
        } else {
            (Direction::Backward, cand_span.start - span.end, &track[track.len()-1], &candidate[0])
        };

        if gap > self.max_gap {
            return Relation::Implausible{ reason: Implausibility::GapTooLong(gap) }
        }

        let dist = distance_between( p_from, p_to) - self.position_noise;
        let dist = if dist.get::<meter>() > 0.0 { dist } else { Length::new::<meter>(0.0) };
        let speed = implied_speed( dist, gap);

        if speed > self.max_speed {
            Relation::Implausible{ reason: Implausibility::ImpliedSpeed(speed) }
        } else {
            Relation::Extension{ direction, gap, implied_speed: speed }
        }
    }

    /// sample both tracks at the points of the respective other track that fall into the overlap
    /// interval. A sample agrees if the distance is within the tolerance, which grows with the time
    /// to the nearest real sample we interpolated from. The tracks are the same flight if at least
    /// half of the samples agree
    fn evaluate_overlap (&self, track: &[Trackpoint], candidate: &[Trackpoint], overlap: &TimeSpan)->Relation {
        let mut separations: Vec<f64> = Vec::new(); // [m]
        let mut n_agree = 0;

        let mut sample = |points: &[Trackpoint], other: &[Trackpoint]| {
            for p in points.iter().filter( |p| overlap.contains(p.timestamp)) {
                if let Some(ip) = position_at( other, p.timestamp) {
                    let dist = haversine_distance( p.lat, p.lon, ip.lat, ip.lon);
                    let allowed = self.overlap_tolerance + interpolation_slack( self.cruise_speed, ip.nearest_sample);
                    if dist <= allowed { n_agree += 1; }
                    separations.push( dist.get::<meter>());
                }
            }
        };
        sample( track, candidate);
        sample( candidate, track);

        let overlap_duration = overlap.duration();
        if separations.is_empty() { // can't happen for non-empty overlapping tracks
            return Relation::OverlapDistinct{ overlap: overlap_duration, separation: Length::new::<meter>(f64::INFINITY) }
        }

        let separation = Length::new::<meter>( median( &mut separations));
        if 2 * n_agree >= separations.len() {
            Relation::OverlapSame{ overlap: overlap_duration, separation }
        } else {
            Relation::OverlapDistinct{ overlap: overlap_duration, separation }
        }
    }

    /// evaluate against all candidates and return them in order of preference, best first.
    /// Ties are broken by candidate key so that the order is total
    pub fn rank_candidates (&self, track: &[Trackpoint], candidates: &[Flight])->Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates.iter().enumerate()
            .map( |(index,c)| ScoredCandidate{ index, relation: self.evaluate( track, c.any_track()) })
            .collect();

        scored.sort_by( |a,b| {
            a.relation.preference_cmp( &b.relation)
                .then_with( || candidates[a.index].id_spec().cmp( candidates[b.index].id_spec()))
        });
        scored
    }

    /// the single best plausible candidate, if any
    pub fn best_match (&self, track: &[Trackpoint], candidates: &[Flight])->Verdict {
        match self.rank_candidates( track, candidates).into_iter().next() {
            Some(sc) if sc.relation.is_plausible() => Verdict::Match(sc),
            _ => Verdict::NoMatch
        }
    }
}

fn interpolation_slack (cruise_speed: Velocity, dt: TimeDelta)->Length {
    Length::new::<meter>( cruise_speed.get::<meter_per_second>() * seconds(dt))
}

fn median (values: &mut [f64])->f64 {
    values.sort_by( |a,b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 { values[n/2] } else { (values[n/2 - 1] + values[n/2]) / 2.0 }
}
