pub mod handlers;
pub mod server;

pub use server::{AppState, JsonResult, RouteError, router, start_server};
