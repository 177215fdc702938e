//! Incident API - HTTP lookup and update of incident records
//!
//! Routes:
//! - `GET /api/incidents/{incidentNumber}` returns the configured fields
//! - `PUT /api/incidents/{incidentNumber}` updates allow-listed fields
//!   and returns the re-read record
//!
//! Errors are returned as `{"error": "<message>"}`. The API performs no
//! authorization of its own; callers are expected to sit behind the
//! identity gate.
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_api::{routes, ApiState};
//!
//! let state = ApiState::new(Arc::new(store), AllowList::from(&fields));
//! warp::serve(routes(state)).run(([127, 0, 0, 1], 3001)).await;
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod handlers;

pub use error::ApiError;
pub use handlers::parse_incident_number;

use incident_core::AllowList;
use incident_store::IncidentStore;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Reply};

/// Largest accepted update body
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    store: Arc<dyn IncidentStore>,
    allow_list: Arc<AllowList>,
}

impl ApiState {
    /// Create state over a store and the update allow-list
    #[must_use]
    pub fn new(store: Arc<dyn IncidentStore>, allow_list: AllowList) -> Self {
        Self {
            store,
            allow_list: Arc::new(allow_list),
        }
    }

    /// Fields permitted in updates
    #[inline]
    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("allow_list", &self.allow_list)
            .finish_non_exhaustive()
    }
}

/// All API routes, with rejection handling and request tracing
pub fn routes(
    state: ApiState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let incident = warp::path!("api" / "incidents" / String);

    let get = incident
        .clone()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_incident);

    let put = incident
        .and(warp::put())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_state(state))
        .and_then(handlers::update_incident);

    let missing = warp::path!("api" / "incidents")
        .and(warp::get().or(warp::put()).unify())
        .and_then(handlers::missing_incident_number);

    get.or(put)
        .or(missing)
        .recover(handlers::handle_rejection)
        .with(warp::trace::request())
}

fn with_state(state: ApiState) -> impl Filter<Extract = (ApiState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
