pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod relay;
pub mod server;
pub mod telemetry;

/**
 * \brief SDK 预导入集合，方便外部引用常用模块。
 */
pub mod prelude {
    pub use crate::config::RelayConfig;
    pub use crate::error::{Failure, RelayError};
    pub use crate::ingest::Inbound;
    pub use crate::models::ChatReply;
    pub use crate::prompts::ChatRole;
    pub use crate::relay::relay;
    pub use crate::server::{self, AppState};
    pub use crate::telemetry;
}
