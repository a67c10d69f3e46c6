mod handlers;
mod model;
mod routes;

pub mod password;
pub mod token;

pub use model::*;
pub use routes::router;
