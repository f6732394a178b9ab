pub mod jsonschema;
pub mod nats;
pub mod telemetry;

#[cfg(any(test, feature = "testing"))]
pub use jsonschema::MockSchemaValidator;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockMessagePublisher;
