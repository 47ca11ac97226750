// Domain layer: value types and the ports (traits) the validator talks to.

pub mod model;
pub mod ports;
