mod relay;

pub use relay::{AppState, RelayService, router, ws_handler};
