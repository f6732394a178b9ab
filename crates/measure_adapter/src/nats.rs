mod envelope_producer;
mod measure_consumer;

pub use envelope_producer::*;
pub use measure_consumer::*;
