// Domain layer: launch value types and the ports (environment, process runner) the core depends on.

pub mod model;
pub mod ports;
