// Layout Engine: content-sized match boxes, two-halves placement,
// pairwise connector merge and the championship offset.
// CPU-bound layout must run inside tokio::task::spawn_blocking.

pub mod bracket;
pub mod font_metrics;
pub mod handlers;
pub mod published;
