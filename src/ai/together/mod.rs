//! Together AI clients (OpenAI-compatible REST API).

pub mod chat;
pub mod client;
pub mod image;

pub use self::image::TogetherImageClient;
pub use chat::TogetherChatClient;
pub use client::TogetherHttpClient;
