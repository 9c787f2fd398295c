//! HTTP surface.
//!
//! Cookie-session authentication (`/auth`, `/user`) and the JSON drive API
//! (`/api/files`) used by the single-page frontend.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
