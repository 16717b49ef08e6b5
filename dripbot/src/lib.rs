//! Dripbot - a slash-command chat bot that drips testnet tokens.
//!
//! Each registered skill parses a slash-command, calls an external HTTP API
//! or cache layer, and sends a reply. The flagship skill is `/drip`, which
//! disburses testnet tokens to the sender's address via the LearnWeb3
//! faucet API.
//!
//! # Architecture
//!
//! - **Skills** ([`skills`]) - Command patterns, typed parameters, dispatch
//! - **Handlers** ([`handlers`]) - The skill implementations
//! - **Context** ([`context`]) - Per-conversation state and the reply channel
//! - **Cache** ([`cache`]) - Key-value backends for externally-cached data
//! - **Faucet** ([`faucet`]) - LearnWeb3 API client
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dripbot::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let registry = default_registry()?;
//!     let mut ctx = SkillContext::new(
//!         "0xABC",
//!         Arc::new(BufferedResponder::new()),
//!         Arc::new(MemoryCache::new()),
//!         Arc::new(LearnWeb3Client::from_env()),
//!     );
//!     registry.dispatch("/drip base_sepolia 0xABC", &mut ctx).await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod faucet;
pub mod handlers;
pub mod skills;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error types (centralized)
    pub use crate::error::{BotError, ConfigError, Result, SkillError, SkillResult};

    // Skills
    pub use crate::skills::{
        ParamKind, ParamSpec, ParamValue, ParsedParams, SkillDefinition, SkillHandler,
        SkillRegistry,
    };

    // Handlers
    pub use crate::handlers::default_registry;

    // Context
    pub use crate::context::{BufferedResponder, Reply, Responder, SkillContext};

    // Cache
    pub use crate::cache::{
        CacheError, CacheStore, FileCache, MemoryCache, SUPPORTED_NETWORKS_KEY,
    };

    // Faucet
    pub use crate::faucet::{
        DripOutcome, FaucetApi, FaucetError, LearnWeb3Client, NetworkDescriptor, Receipt,
        SupportedNetworks,
    };

    // Config
    pub use crate::config::{
        BotConfig, CacheConfig, FaucetConfig, config_path, init_config, load_config, save_config,
    };
}
