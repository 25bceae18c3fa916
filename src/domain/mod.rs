// Domain layer: core models, diagnostics and ports (interfaces).

pub mod assignment;
pub mod diagnostics;
pub mod model;
pub mod ports;
