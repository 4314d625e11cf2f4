//! Client side of the catalog: HTTP access, the session, and the filterable in-memory view.

pub mod api;
pub mod error;
pub mod progress;
pub mod session;
pub mod upload;
pub mod view;

pub use api::{CatalogApi, CatalogBackend};
pub use error::ClientError;
pub use session::Session;
pub use upload::PreparedFile;
pub use view::{CatalogView, DeleteOutcome, KindFilter};
