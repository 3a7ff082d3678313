pub mod assets;
pub mod config;
pub mod error;
pub mod proxy;
pub mod server;
pub mod upstream;

pub use config::{ApiKey, GatewayConfig, ResolvedUpstream, UpstreamSlot};
pub use error::{GatewayError, GatewayResult};
pub use proxy::{handle_completion_request, ProxyResponse};
pub use server::{router, serve, AppState};
pub use upstream::{CompletionUpstream, HttpUpstream, UpstreamReply};
