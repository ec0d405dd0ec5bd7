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

use thiserror::Error;

pub type Result<T> = std::result::Result<T,OdinFlightDbError>;

/// the errors visible to callers of the flight database.
/// Ingestion and query callers only ever see the first four variants
#[derive(Error,Debug)]
pub enum OdinFlightDbError {

    #[error("invalid track fragment: {0}")]
    InvalidFragment(String),

    #[error("malformed IdSpec: {0}")]
    MalformedIdSpec(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("reconciliation conflict: {0}")]
    ReconciliationConflict(String),

    #[error("no such entry: {0}")]
    NotFound(String),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),
}

impl OdinFlightDbError {
    /// can the whole call be re-issued without risking inconsistent state
    pub fn is_retryable (&self)->bool {
        matches!( self, OdinFlightDbError::StoreUnavailable(_) | OdinFlightDbError::ReconciliationConflict(_))
    }
}

impl From<StoreError> for OdinFlightDbError {
    fn from (e: StoreError)->Self { OdinFlightDbError::StoreUnavailable( e.to_string()) }
}

impl From<ron::error::SpannedError> for OdinFlightDbError {
    fn from (e: ron::error::SpannedError)->Self { OdinFlightDbError::ConfigError( e.to_string()) }
}

pub fn invalid_fragment (msg: impl ToString)->OdinFlightDbError {
    OdinFlightDbError::InvalidFragment(msg.to_string())
}

pub fn malformed_id_spec (msg: impl ToString)->OdinFlightDbError {
    OdinFlightDbError::MalformedIdSpec(msg.to_string())
}

pub fn store_unavailable (msg: impl ToString)->OdinFlightDbError {
    OdinFlightDbError::StoreUnavailable(msg.to_string())
}

pub fn reconciliation_conflict (msg: impl ToString)->OdinFlightDbError {
    OdinFlightDbError::ReconciliationConflict(msg.to_string())
}

/* #region store errors ****************************************************************************/

pub type StoreResult<T> = std::result::Result<T,StoreError>;

/// what a [`crate::store::FlightStore`] adapter can report. All of these are transient from the
/// perspective of the merge engine
#[derive(Error,Debug)]
pub enum StoreError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("query result truncated after {0} entries")]
    Truncated(usize),

    #[error("document codec error {0}")]
    Codec( #[from] serde_json::Error),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),
}

/* #endregion store errors */
