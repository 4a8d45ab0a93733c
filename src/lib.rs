pub mod error;
pub mod config;
pub mod request;
pub mod keypool;
pub mod providers;
pub mod failover;
pub mod wiki;
pub mod prompt;
pub mod format;
pub mod memo;
pub mod stats;
pub mod pipeline;
pub mod server;

/*

wikisum: summarizes Wikipedia articles with an LLM, or answers
directly when no article matches, behind a small JSON API.

wikisum/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Module list and re-exports
│   ├── main.rs         # Binary: env, logging, server
│   ├── error.rs        # Error type
│   ├── config.rs       # Service, provider and failover config
│   ├── request.rs      # Request/response types and enums
│   ├── keypool.rs      # Rotating credential pool
│   ├── providers/      # LLM transports (Mistral)
│   ├── failover.rs     # Credential cascade + model downgrade
│   ├── wiki/           # Locator and MediaWiki source
│   ├── prompt.rs       # Prompt builder
│   ├── format.rs       # Reply -> HTML fragment
│   ├── memo.rs         # Fingerprinted response memo
│   ├── stats.rs        # Counters
│   ├── pipeline.rs     # Orchestrator
│   └── server.rs       # axum routes
└── tests/

*/

pub use error::Error;
pub use pipeline::Summarizer;
pub use request::{
  Language, Length, Mode, Source, SummaryRequest, SummaryResponse
};
