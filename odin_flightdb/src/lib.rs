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

//! a flight database that reconciles unordered, partial and redelivered ADS-B track fragments
//! into one persisted [`Flight`] per physical flight, keyed by its `ICAO@start:end` [`IdSpec`]

pub mod errors;
pub use errors::{OdinFlightDbError, Result};

pub mod config;
pub use config::{FlightDbConfig, load_config};

pub mod trackpoint;
pub use trackpoint::{DataSystem, TimeSpan, TrackFragment, Trackpoint};

pub mod geo;

pub mod idspec;
pub use idspec::IdSpec;

pub mod flight;
pub use flight::Flight;

pub mod store;
pub use store::{FlightStore, KeySelector, MemoryStore, QueryPage};

pub mod query;
pub use query::Query;

pub mod plausibility;
pub use plausibility::{PlausibilityEvaluator, Relation, Verdict};

pub mod merge;
pub use merge::{FlightDb, MergeOutcome};

pub mod share;
pub use share::IdSpecSetStore;
