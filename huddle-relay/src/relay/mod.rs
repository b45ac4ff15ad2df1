mod relay_service;
mod ws_handler;

pub use relay_service::RelayService;
pub use ws_handler::{AppState, router, ws_handler};
