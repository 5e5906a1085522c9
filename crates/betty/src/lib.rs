//! Betty: a deadpan restaurant-analytics assistant built on `marginedge`.
//!
//! Betty answers purchasing questions over a saved snapshot by letting the
//! model call the `marginedge` analytics tools, one per question.
//!
//! # Library usage
//!
//! ```ignore
//! use betty::{BettyConfig, repl};
//! use marginedge::prelude::*;
//!
//! let config = BettyConfig::from_env()?;
//! let snapshot = Snapshot::load(&config.snapshot_path)?;
//! let dataset = Arc::new(Dataset::from_snapshot(&snapshot));
//! let chat = ChatClient::with_url(config.api_key.clone(), config.chat_url())?;
//! let mut assistant = Assistant::new(
//!     chat,
//!     config.build_tool_set(dataset, today),
//!     config.build_assistant_config(),
//! );
//! repl::run(&mut assistant, stdin.lock(), stdout()).await?;
//! ```

pub mod config;
pub mod prompt;
pub mod repl;

pub use config::BettyConfig;
pub use prompt::betty_system_prompt;
