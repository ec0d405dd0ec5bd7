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

use std::{collections::BTreeMap, ops::Bound, path::{Path,PathBuf}, fs::File, io::{BufReader,BufWriter}};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::{StoreError, StoreResult};

/// schema-less documents as they are kept by the store
pub type Document = Value;

/// which keys a store query should return
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum KeySelector {
    Exact(String),
    Prefix(String),
}

impl KeySelector {
    pub fn matches (&self, key: &str)->bool {
        match self {
            KeySelector::Exact(k) => key == k,
            KeySelector::Prefix(p) => key.starts_with( p.as_str()),
        }
    }
}

/// one page of query results in ascending key order. If `next_cursor` is set the caller has to
/// re-issue the query with it to get the remaining entries. Stores that silently cap results have
/// to report that with `truncated`
#[derive(Debug,Default)]
pub struct QueryPage {
    pub entries: Vec<(String,Document)>,
    pub next_cursor: Option<String>,
    pub truncated: bool,
}

/// abstraction of the (remote, eventually consistent) document store we persist flights in.
/// The only guarantee we rely on is that single key writes are atomic and eventually visible
#[async_trait]
pub trait FlightStore: Send + Sync {
    async fn get (&self, key: &str)->StoreResult<Option<Document>>;

    async fn put (&self, key: &str, doc: Document)->StoreResult<()>;

    /// deleting a non-existing key is not an error
    async fn delete (&self, key: &str)->StoreResult<()>;

    /// entries matching `selector` with keys strictly greater than `cursor`, at most `limit` of them
    async fn query (&self, selector: &KeySelector, cursor: Option<&str>, limit: usize)->StoreResult<QueryPage>;
}

/* #region MemoryStore ******************************************************************************/

/// a BTreeMap based FlightStore that can be initialized from and saved to a JSON file
pub struct MemoryStore {
    map: RwLock<BTreeMap<String,Document>>,
    max_page: usize, // upper bound for query pages, independent of what the caller asks for
}

impl MemoryStore {
    pub fn new ()->Self {
        MemoryStore { map: RwLock::new( BTreeMap::new()), max_page: usize::MAX }
    }

    pub fn with_max_page (mut self, max_page: usize)->Self {
        self.max_page = max_page.max(1);
        self
    }

    pub fn from_json_file<P: AsRef<Path>> (path: P)->StoreResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let map: BTreeMap<String,Document> = serde_json::from_reader(reader)?;
        Ok( MemoryStore { map: RwLock::new(map), max_page: usize::MAX } )
    }

    pub async fn save_to_json_file<P: AsRef<Path>> (&self, path: P)->StoreResult<()> {
        let map = self.map.read().await;
        let file = File::create(path)?;
        serde_json::to_writer_pretty( BufWriter::new(file), &*map)?;
        Ok(())
    }

    pub async fn len (&self)->usize { self.map.read().await.len() }

    pub async fn keys (&self)->Vec<String> { self.map.read().await.keys().cloned().collect() }
}

impl Default for MemoryStore {
    fn default()->Self { MemoryStore::new() }
}

#[async_trait]
impl FlightStore for MemoryStore {
    async fn get (&self, key: &str)->StoreResult<Option<Document>> {
        Ok( self.map.read().await.get(key).cloned() )
    }

    async fn put (&self, key: &str, doc: Document)->StoreResult<()> {
        self.map.write().await.insert( key.to_string(), doc);
        Ok(())
    }

    async fn delete (&self, key: &str)->StoreResult<()> {
        self.map.write().await.remove(key);
        Ok(())
    }

    async fn query (&self, selector: &KeySelector, cursor: Option<&str>, limit: usize)->StoreResult<QueryPage> {
        let map = self.map.read().await;
        let limit = limit.min( self.max_page).max(1);

        let lower: Bound<&str> = match (selector, cursor) {
            (_, Some(c)) => Bound::Excluded(c),
            (KeySelector::Exact(k), None) => Bound::Included(k.as_str()),
            (KeySelector::Prefix(p), None) => Bound::Included(p.as_str()),
        };

        let mut entries: Vec<(String,Document)> = Vec::new();
        let mut has_more = false;

        for (k,v) in map.range::<str,_>( (lower, Bound::Unbounded)) {
            if !selector.matches(k) { break } // keys are ordered, all selectors are contiguous

            if entries.len() == limit {
                has_more = true;
                break
            }
            entries.push( (k.clone(), v.clone()));
        }

        let next_cursor = if has_more { entries.last().map( |(k,_)| k.clone()) } else { None };
        Ok( QueryPage { entries, next_cursor, truncated: false } )
    }
}

/* #endregion MemoryStore */
