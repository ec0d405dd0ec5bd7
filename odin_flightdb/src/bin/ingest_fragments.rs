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

use std::{fs::File, io::{BufRead,BufReader}, path::{Path,PathBuf}, sync::Arc};
use tokio;
use anyhow::{Context, Result};
use clap::Parser;
use futures::{stream, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use odin_flightdb::{load_config, FlightDb, FlightDbConfig, MemoryStore, MergeOutcome, TrackFragment};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "ingest JSON-lines track fragment files into a flight store file")]
pub struct Args {
    /// RON config file (uses built-in defaults if not set)
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// JSON store file, loaded if it exists and saved after ingestion
    #[arg(short,long, default_value = "flights.json")]
    pub store: PathBuf,

    /// max number of fragments that are processed concurrently
    #[arg(short,long, default_value_t = 8)]
    pub workers: usize,

    /// retry fragments that failed with transient errors
    #[arg(short,long)]
    pub retry: bool,

    #[arg(num_args=1..)]
    pub fragment_files: Vec<PathBuf>
}

#[derive(Debug,Default)]
struct Stats { created: usize, extended: usize, merged: usize, unchanged: usize, failed: usize }

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let config: FlightDbConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => FlightDbConfig::default()
    };

    let store = if args.store.is_file() {
        Arc::new( MemoryStore::from_json_file( &args.store).with_context( || format!("loading {:?}", args.store))?)
    } else {
        Arc::new( MemoryStore::new())
    };
    let db = FlightDb::new( store.clone(), config);

    let mut fragments: Vec<TrackFragment> = Vec::new();
    for path in &args.fragment_files {
        read_fragments( path, &mut fragments)?;
    }
    info!("ingesting {} fragments with {} workers", fragments.len(), args.workers);

    let retry = args.retry;

    let results: Vec<odin_flightdb::Result<MergeOutcome>> = stream::iter( fragments.iter())
        .map( |frag| {
            let db = &db;
            async move {
                if retry { db.add_track_fragment_with_retry( frag).await } else { db.add_track_fragment( frag).await }
            }
        })
        .buffer_unordered( args.workers.max(1))
        .collect().await;

    let mut stats = Stats::default();
    for res in &results {
        match res {
            Ok(MergeOutcome::Created{..}) => stats.created += 1,
            Ok(MergeOutcome::Extended{..}) => stats.extended += 1,
            Ok(MergeOutcome::Merged{..}) => stats.merged += 1,
            Ok(MergeOutcome::Unchanged{..}) => stats.unchanged += 1,
            Err(_) => stats.failed += 1,
        }
    }
    println!("{stats:?}");

    store.save_to_json_file( &args.store).await?;
    println!("saved {} entries to {:?}", store.len().await, args.store);

    Ok(())
}

fn read_fragments (path: &Path, fragments: &mut Vec<TrackFragment>)->Result<()> {
    let reader = BufReader::new( File::open(path).with_context( || format!("opening {path:?}"))?);

    for (i,line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() { continue }

        match serde_json::from_str::<TrackFragment>( line) {
            Ok(frag) => fragments.push( frag),
            Err(e) => warn!("skipping {path:?}:{}: {e}", i+1)
        }
    }
    Ok(())
}
