//! Chat-completion backend clients.
//!
//! One implementation today: [`OpenAiClient`], which speaks the
//! `/v1/chat/completions` wire format. Since most hosted backends expose a
//! compatible endpoint, the same client covers proxies and self-hosted
//! gateways by pointing `api_url` elsewhere.

pub mod openai;

pub use openai::OpenAiClient;
