//! HTTP API module for the Courier Quote Engine.
//!
//! This module provides the REST API endpoints for quoting shipments across
//! couriers and managing courier configurations.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CourierUpsertRequest, PincodeInput, RecommendRequest};
pub use response::{
    AckResponse, ApiError, ApiErrorResponse, CourierListResponse, CourierResponse,
    RecentResponse, Recommendation, RecommendResponse,
};
pub use state::AppState;
