// Resume pipeline core: extraction, normalization, the canonical model and
// the shared structure both document renderers draw from.
// Everything here is synchronous and pure apart from logging; callers run
// extraction inside tokio::task::spawn_blocking.

pub mod classify;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod outline;
pub mod text_format;
