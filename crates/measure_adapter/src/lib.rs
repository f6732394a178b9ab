pub mod domain;
pub mod http;
pub mod measure_adapter;
pub mod nats;
pub mod schemas;

pub use domain::*;
pub use http::*;
pub use measure_adapter::*;
pub use nats::*;
pub use schemas::*;
