pub mod config;
pub mod error;
pub mod hn_client;
pub mod models;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{FailureInfo, FailureKind, SearchError, StoreError};
pub use hn_client::{HackerNewsClient, SearchBackend};
pub use models::{Hit, ResultPage, SearchResults, Status};
pub use session::{FetchOutcome, SearchSession};
pub use store::{FetchRequest, SearchResultStore, Snapshot};
