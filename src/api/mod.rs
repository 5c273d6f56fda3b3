//! HTTP API
//!
//! ```text
//!   GET /sentiment/:symbol ──┐
//!   GET /api/v1/...  ────────┤
//!                            ▼
//!                       routes.rs ──► SentimentAggregator ──► fetchers (parallel)
//!                            │
//!                            ├──► HistoryStore (optional, append on success)
//!                            ▼
//!                       response.rs (JSON body + status mapping)
//! ```

pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use response::{ApiError, ErrorResponse, SentimentResponse, SourceEntry};
pub use routes::create_router;
pub use server::serve;
pub use state::AppState;
