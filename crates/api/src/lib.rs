//! HTTP layer for the polls application.
//!
//! - **Endpoints**: public poll pages and the admin API
//! - **Extractors**: admin authentication
//! - **Templates**: embedded Tera pages
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod response;
pub mod state;
pub mod templates;

pub use endpoints::router;
pub use state::AppState;
pub use templates::Templates;
