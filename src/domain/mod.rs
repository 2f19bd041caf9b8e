// Domain layer: answer enums, dataset records and the ports the phases run
// against. No process or filesystem side effects live here.

pub mod model;
pub mod ports;
