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

use std::{path::PathBuf, sync::Arc};
use tokio;
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_flightdb::{load_config, Flight, FlightDb, FlightDbConfig, IdSpec, IdSpecSetStore, MemoryStore, Query};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "look up flights in a flight store file")]
pub struct Args {
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    #[arg(short,long, default_value = "flights.json")]
    pub store: PathBuf,

    /// ICAO address for range lookups
    #[arg(short,long)]
    pub icao: Option<String>,

    /// range start in epoch seconds (with --icao)
    #[arg(long)]
    pub from: Option<i64>,

    /// range end in epoch seconds (with --icao)
    #[arg(long)]
    pub to: Option<i64>,

    /// save the IdSpecs of the result as a shareable set and print its key
    #[arg(long)]
    pub share: bool,

    /// look up all flights of a previously shared set
    #[arg(long)]
    pub load: Option<String>,

    /// print the trackpoints of each flight
    #[arg(short,long)]
    pub verbose: bool,

    /// IdSpecs (`ICAO@start:end`) of flights to look up
    pub id_specs: Vec<String>
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let config: FlightDbConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => FlightDbConfig::default()
    };
    let store = Arc::new( MemoryStore::from_json_file( &args.store)?);
    let db = FlightDb::new( store.clone(), config);
    let sets = IdSpecSetStore::new( store.clone());

    let mut queries: Vec<Query> = Vec::new();
    if let Some(key) = &args.load {
        for s in sets.load( key).await? {
            queries.push( Query::by_id_spec( IdSpec::parse(&s)?));
        }
    }
    for s in &args.id_specs {
        queries.push( Query::by_id_spec( IdSpec::parse(s)?));
    }
    if let Some(icao) = &args.icao {
        queries.push( match (args.from, args.to) {
            (Some(from), Some(to)) => Query::by_icao_and_range_secs( icao, from, to),
            (None, None) => Query::by_icao( icao),
            _ => return Err( anyhow!("range lookups need both --from and --to"))
        });
    }
    if queries.is_empty() {
        return Err( anyhow!("nothing to look up"))
    }

    let mut flights: Vec<Flight> = Vec::new();
    for query in &queries {
        flights.extend( db.lookup_all( query).await?);
    }

    for flight in &flights {
        println!("{flight}");
        if args.verbose {
            for p in flight.any_track() { println!("    {p}"); }
        }
    }
    println!("{} flights found", flights.len());

    if args.share && !flights.is_empty() {
        let id_specs: Vec<String> = flights.iter().map( |f| f.id_spec_string()).collect();
        let key = sets.save( &id_specs).await?;
        store.save_to_json_file( &args.store).await?;
        println!("shared as {key}");
    }

    Ok(())
}
