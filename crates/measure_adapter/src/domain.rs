mod coercion;
mod device_descriptor;
mod dispatcher;
mod envelope;
mod error;
mod field_mapper;
mod filials;
mod normalizer;
mod param_builder;
mod port_address;
mod provider;
mod request;
mod result_checker;
mod task;
mod transposer;

pub use coercion::*;
pub use device_descriptor::*;
pub use dispatcher::*;
pub use envelope::*;
pub use error::*;
pub use field_mapper::*;
pub use filials::*;
pub use normalizer::*;
pub use param_builder::*;
pub use port_address::*;
pub use provider::*;
pub use request::*;
pub use result_checker::*;
pub use task::*;
pub use transposer::*;
