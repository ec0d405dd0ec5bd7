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

use std::{fmt, sync::Arc};
use dashmap::DashMap;
use tokio::{sync::Mutex, time};
use tracing::{debug, info, warn};

use crate::config::FlightDbConfig;
use crate::errors::{Result, OdinFlightDbError, invalid_fragment, reconciliation_conflict, store_unavailable};
use crate::flight::Flight;
use crate::plausibility::{PlausibilityEvaluator, Relation, ScoredCandidate};
use crate::query::{self, Query};
use crate::store::FlightStore;
use crate::trackpoint::{TimeSpan, TrackFragment};

/// what a successful `add_track_fragment` did to the store. Keys of re-keyed flights change
/// since the key embeds the time span
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum MergeOutcome {
    Created { key: String },
    Extended { old_key: String, new_key: String },
    Merged { old_keys: Vec<String>, new_key: String }, // fragment connected several flights
    Unchanged { key: String }, // all fragment points were already known
}

impl MergeOutcome {
    /// the key of the flight that now holds the fragment points
    pub fn key (&self)->&str {
        match self {
            MergeOutcome::Created{key} => key,
            MergeOutcome::Extended{new_key,..} => new_key,
            MergeOutcome::Merged{new_key,..} => new_key,
            MergeOutcome::Unchanged{key} => key,
        }
    }

    pub fn is_write (&self)->bool { !matches!( self, MergeOutcome::Unchanged{..}) }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Created{key} => write!( f, "created {key}"),
            MergeOutcome::Extended{old_key,new_key} => write!( f, "extended {old_key} -> {new_key}"),
            MergeOutcome::Merged{old_keys,new_key} => write!( f, "merged [{}] -> {new_key}", old_keys.join(",")),
            MergeOutcome::Unchanged{key} => write!( f, "unchanged {key}"),
        }
    }
}

/// the flight database: reconciles unordered, redelivered track fragments into one persisted
/// Flight per physical flight.
///
/// All reconciliation steps for one aircraft run inside a per-ICAO critical section, calls for
/// different aircraft run in parallel. The store is only ever updated by writing the new flight
/// before retiring the keys it replaces, i.e. readers might transiently see both but never none
pub struct FlightDb {
    store: Arc<dyn FlightStore>,
    config: FlightDbConfig,
    evaluator: PlausibilityEvaluator,
    icao_locks: DashMap<String,Arc<Mutex<()>>>,
}

impl FlightDb {
    pub fn new (store: Arc<dyn FlightStore>, config: FlightDbConfig)->Self {
        let evaluator = PlausibilityEvaluator::new( &config);
        FlightDb { store, config, evaluator, icao_locks: DashMap::new() }
    }

    pub fn store (&self)->&Arc<dyn FlightStore> { &self.store }

    pub fn config (&self)->&FlightDbConfig { &self.config }

    pub fn evaluator (&self)->&PlausibilityEvaluator { &self.evaluator }

    /* #region ingestion *****************************************************************************/

    /// the sole write entry point. Safe to call again with the same fragment, and safe to retry
    /// on `StoreUnavailable` or `ReconciliationConflict`
    pub async fn add_track_fragment (&self, frag: &TrackFragment)->Result<MergeOutcome> {
        frag.validate()?;
        let icao = frag.icao_key();

        let lock = self.icao_lock( &icao);
        let res = match time::timeout( self.config.lock_timeout, lock.lock()).await {
            Ok(guard) => {
                let res = match time::timeout( self.config.call_timeout, self.reconcile( &icao, frag)).await {
                    Ok(res) => res,
                    Err(_) => Err( store_unavailable( format!("store operations for {icao} exceeded {:?}", self.config.call_timeout)))
                };
                drop(guard);
                res
            }
            Err(_) => Err( reconciliation_conflict( format!("timeout waiting for {icao} critical section")))
        };

        drop(lock);
        self.icao_locks.remove_if( &icao, |_,m| Arc::strong_count(m) == 1);

        match &res {
            Ok(outcome) => info!("{frag}: {outcome}"),
            Err(e) => warn!("{frag} failed: {e}")
        }
        res
    }

    /// `add_track_fragment` for message bus workers that have no retry policy of their own
    pub async fn add_track_fragment_with_retry (&self, frag: &TrackFragment)->Result<MergeOutcome> {
        let mut attempt = 0;
        loop {
            match self.add_track_fragment( frag).await {
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    debug!("retry {attempt} of {} after: {e}", self.config.max_retries);
                    time::sleep( self.config.retry_delay).await;
                }
                res => return res
            }
        }
    }

    fn icao_lock (&self, icao: &str)->Arc<Mutex<()>> {
        self.icao_locks.entry( icao.to_string()).or_insert_with( || Arc::new( Mutex::new(()))).value().clone()
    }

    /// number of aircraft with calls in flight
    pub fn active_icaos (&self)->usize { self.icao_locks.len() }

    // called from within the critical section
    async fn reconcile (&self, icao: &str, frag: &TrackFragment)->Result<MergeOutcome> {
        let points = frag.canonical_points();
        let span = TimeSpan::of_track( &points).ok_or_else( || invalid_fragment( format!("no trackpoints in {frag}")))?;

        let candidates = self.find_candidates( icao, &span).await?;
        debug!("{icao}: {} candidates for fragment {span}", candidates.len());

        if let Some(flight) = candidates.iter().find( |f| f.contains_all( &points)) {
            // a redelivery after a failed call might still find flights that call did not retire
            let (merged, retired) = self.absorb( flight.clone(), vec![flight.clone()]).await?;
            if retired.len() == 1 {
                return Ok( MergeOutcome::Unchanged{ key: flight.key() })
            }
            return self.replace( merged, retired).await
        }

        let ranked = self.evaluator.rank_candidates( &points, &candidates);
        let Some(best) = ranked.into_iter().next().filter( |sc| sc.relation.is_plausible()) else {
            return self.create( frag).await
        };

        let primary = &candidates[best.index];
        debug!("{icao}: best match {} {}", primary.key(), best.relation);

        let merged = primary.merged_with( &points, &frag.callsign, frag.data_system)?;
        let (merged, retired) = self.absorb( merged, vec![primary.clone()]).await?;

        self.replace( merged, retired).await
    }

    async fn create (&self, frag: &TrackFragment)->Result<MergeOutcome> {
        let flight = Flight::from_fragment( frag)?;
        // a same-keyed flight would have been a candidate, so it is a distinct flight we keep next to it
        self.put_flight( &flight, &[]).await?;
        Ok( MergeOutcome::Created{ key: flight.key() })
    }

    /// grow `merged` until there are no more compatible flights in its neighborhood. This connects
    /// flights that were filed separately before the fragments between them arrived
    async fn absorb (&self, mut merged: Flight, mut retired: Vec<Flight>)->Result<(Flight,Vec<Flight>)> {
        loop {
            let span = merged.time_span();
            let mut candidates = self.find_candidates( &merged.icao_id, &span).await?;
            candidates.retain( |c| !retired.contains(c));

            let mut grown = false;
            for sc in self.evaluator.rank_candidates( merged.any_track(), &candidates) {
                let candidate = &candidates[sc.index];
                // the merged track changes with each absorbed flight
                let relation = self.evaluator.evaluate( merged.any_track(), candidate.any_track());
                if relation.is_plausible() {
                    debug!("{}: absorbing {} {relation}", merged.icao_id, candidate.key());
                    merged = merged.merged_with( candidate.any_track(), &candidate.callsign, candidate.data_system)?;
                    retired.push( candidate.clone());
                    grown = true;
                }
            }

            if !grown {
                return Ok( (merged, retired))
            }
        }
    }

    /// put `merged` under its (possibly new) key, then retire the keys of the flights it replaces
    async fn replace (&self, merged: Flight, retired: Vec<Flight>)->Result<MergeOutcome> {
        let new_key = merged.key();

        for flight in &retired {
            self.check_unchanged( flight).await?;
        }
        self.put_flight( &merged, &retired).await?;

        for flight in &retired {
            if flight.key() != new_key {
                self.retire_flight( flight).await?;
            }
        }

        let old_keys: Vec<String> = retired.iter().map( |f| f.key()).collect();

        if old_keys.len() == 1 {
            Ok( MergeOutcome::Extended{ old_key: old_keys[0].clone(), new_key })
        } else {
            Ok( MergeOutcome::Merged{ old_keys, new_key })
        }
    }

    /// optimistic check that nobody else changed a flight we are about to replace
    async fn check_unchanged (&self, flight: &Flight)->Result<()> {
        let key = flight.key();
        if self.flights_at( &key).await?.contains( flight) {
            Ok(())
        } else {
            Err( reconciliation_conflict( format!("flight {key} changed or retired concurrently")))
        }
    }

    async fn flights_at (&self, key: &str)->Result<Vec<Flight>> {
        match self.store.get( key).await? {
            Some(doc) => Ok( Flight::flights_from_document(doc)? ),
            None => Ok( Vec::new())
        }
    }

    /// store `flight` under its key, replacing the given flights if they share it. Other flights
    /// already stored under this key are kept
    async fn put_flight (&self, flight: &Flight, replacing: &[Flight])->Result<()> {
        let key = flight.key();
        let mut flights = self.flights_at( &key).await?;
        flights.retain( |f| !replacing.contains(f));
        if !flights.is_empty() {
            debug!("{key} is shared by {} distinct flights", flights.len() + 1);
        }
        flights.push( flight.clone());

        self.store.put( &key, Flight::flights_to_document( &flights)?).await?;
        Ok(())
    }

    /// remove `flight` from its key, which is deleted once there is no other flight left
    async fn retire_flight (&self, flight: &Flight)->Result<()> {
        let key = flight.key();
        let mut flights = self.flights_at( &key).await?;
        let n = flights.len();
        flights.retain( |f| f != flight);

        if flights.is_empty() {
            self.store.delete( &key).await?;
        } else if flights.len() < n {
            self.store.put( &key, Flight::flights_to_document( &flights)?).await?;
        }
        Ok(())
    }

    /// flights of the aircraft whose span intersects `span` widened by the max extension gap. Since
    /// this uses the current flight spans, a late fragment still finds a flight that has grown
    /// past its own neighborhood
    async fn find_candidates (&self, icao: &str, span: &TimeSpan)->Result<Vec<Flight>> {
        let window = span.widened( self.evaluator.max_gap());
        let query = Query::by_icao_and_range( icao, window.start, window.end);
        query::lookup_all( self.store.as_ref(), &query, self.config.query_page_size).await
    }

    /* #endregion ingestion */

    /* #region lookup ********************************************************************************/

    /// all flights matching the query, ordered by id_spec. No match is not an error
    pub async fn lookup_all (&self, query: &Query)->Result<Vec<Flight>> {
        match time::timeout( self.config.call_timeout, query::lookup_all( self.store.as_ref(), query, self.config.query_page_size)).await {
            Ok(res) => res,
            Err(_) => Err( store_unavailable( format!("{query} exceeded {:?}", self.config.call_timeout)))
        }
    }

    pub async fn lookup_first (&self, query: &Query)->Result<Option<Flight>> {
        Ok( self.lookup_all( query).await?.into_iter().next() )
    }

    /// the flight of this aircraft with the latest end time
    pub async fn lookup_most_recent (&self, icao: &str)->Result<Option<Flight>> {
        let flights = self.lookup_all( &Query::by_icao( icao)).await?;
        Ok( flights.into_iter().max_by( |a,b| {
            (a.id_spec().end(), a.id_spec().start()).cmp( &(b.id_spec().end(), b.id_spec().start()))
        }))
    }

    /* #endregion lookup */
}
