pub mod schema;

pub use schema::{
    Config, GatewayConfig, GeminiConfig, RetrievalConfig, ScrapeConfig, SessionConfig,
};
