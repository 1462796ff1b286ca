//! Model providers that implement [`Responder`](crate::agent_loop::Responder).

pub mod http;

#[cfg(feature = "openai")]
pub mod openai;
