// Domain layer: core models and ports (interfaces). No network or config concerns here.

pub mod model;
pub mod ports;
