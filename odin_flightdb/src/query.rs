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

use std::fmt;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::{Result, StoreError};
use crate::flight::Flight;
use crate::idspec::{IdSpec, normalize_icao};
use crate::store::{FlightStore, KeySelector};
use crate::trackpoint::TimeSpan;

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum QuerySelector {
    ByIdSpec(IdSpec),
    ByIcaoAndRange { icao: String, start: i64, end: i64 }, // epoch seconds, inclusive
    ByIcao(String),
}

/// what flights to look up. Results are ordered by id_spec (icao, start, end)
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Query {
    selector: QuerySelector,
    limit: Option<usize>,
}

impl Query {
    /// exact key lookup
    pub fn by_id_spec (id_spec: IdSpec)->Self {
        Query { selector: QuerySelector::ByIdSpec(id_spec), limit: None }
    }

    /// all flights of the aircraft whose span intersects [start,end]
    pub fn by_icao_and_range (icao: &str, start: DateTime<Utc>, end: DateTime<Utc>)->Self {
        let span = TimeSpan::new( start, end);
        Query::by_icao_and_range_secs( icao, span.start_secs(), span.end_secs())
    }

    pub fn by_icao_and_range_secs (icao: &str, start: i64, end: i64)->Self {
        let (start,end) = if start <= end { (start,end) } else { (end,start) };
        Query { selector: QuerySelector::ByIcaoAndRange{ icao: normalize_icao(icao), start, end }, limit: None }
    }

    pub fn by_icao (icao: &str)->Self {
        Query { selector: QuerySelector::ByIcao( normalize_icao(icao)), limit: None }
    }

    pub fn limit (mut self, n: usize)->Self {
        self.limit = Some(n);
        self
    }

    pub fn selector (&self)->&QuerySelector { &self.selector }

    pub fn key_selector (&self)->KeySelector {
        match &self.selector {
            QuerySelector::ByIdSpec(spec) => KeySelector::Exact( spec.to_string()),
            // the key format does not sort by time (epochs are not padded) so ranges are filtered per aircraft
            QuerySelector::ByIcaoAndRange{icao,..} => KeySelector::Prefix( IdSpec::key_prefix(icao)),
            QuerySelector::ByIcao(icao) => KeySelector::Prefix( IdSpec::key_prefix(icao)),
        }
    }

    pub fn matches (&self, id_spec: &IdSpec)->bool {
        match &self.selector {
            QuerySelector::ByIdSpec(spec) => spec == id_spec,
            QuerySelector::ByIcaoAndRange{icao,start,end} => id_spec.icao() == icao && id_spec.intersects_range( *start, *end),
            QuerySelector::ByIcao(icao) => id_spec.icao() == icao,
        }
    }
}


impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            QuerySelector::ByIdSpec(spec) => write!( f, "Query( id_spec: {spec}")?,
            QuerySelector::ByIcaoAndRange{icao,start,end} => write!( f, "Query( icao: {icao}, range: {start}:{end}")?,
            QuerySelector::ByIcao(icao) => write!( f, "Query( icao: {icao}")?,
        }
        if let Some(limit) = self.limit { write!( f, ", limit: {limit}")?; }
        write!( f, " )")
    }
}

/// execute a query against the store. Paginated queries are followed until exhaustion, a store that
/// reports truncated results fails the whole lookup. No match is an empty result, not an error
pub async fn lookup_all (store: &dyn FlightStore, query: &Query, page_size: usize)->Result<Vec<Flight>> {
    let mut flights: Vec<Flight> = Vec::new();

    match &query.selector {
        QuerySelector::ByIdSpec(spec) => {
            if let Some(doc) = store.get( &spec.to_string()).await? {
                flights.extend( Flight::flights_from_document(doc)?);
            }
        }
        _ => {
            let selector = query.key_selector();
            let mut cursor: Option<String> = None;
            let mut n_pages = 0;

            loop {
                let page = store.query( &selector, cursor.as_deref(), page_size).await?;
                n_pages += 1;
                if page.truncated {
                    return Err( StoreError::Truncated( flights.len() + page.entries.len()).into())
                }

                for (key,doc) in page.entries {
                    match IdSpec::parse(&key) {
                        Ok(id_spec) => {
                            if query.matches( &id_spec) {
                                flights.extend( Flight::flights_from_document(doc)?);
                            }
                        }
                        Err(e) => warn!("ignoring non-flight key {key} in {query}")
                    }
                }

                match page.next_cursor {
                    Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
                    Some(next) => return Err( StoreError::Unavailable( format!("store query cursor did not advance past {next}")).into()),
                    None => break
                }
            }
            debug!("{query} retrieved {} flights in {n_pages} pages", flights.len());
        }
    }

    flights.sort_by( |a,b| a.canonical_cmp(b));
    if let Some(limit) = query.limit {
        flights.truncate(limit);
    }
    Ok(flights)
}
