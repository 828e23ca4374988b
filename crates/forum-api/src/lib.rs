pub mod auth;
pub mod error;
pub mod feed;
pub mod images;
pub mod moderation;
pub mod ownership;
pub mod params;
pub mod posts;
pub mod questionnaires;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;

pub use routes::router;
pub use state::{AppState, AppStateInner};
