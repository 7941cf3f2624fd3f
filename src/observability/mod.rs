// Observability: metrics recording and exposition

pub mod metrics;

pub use metrics::{install_recorder, render};
