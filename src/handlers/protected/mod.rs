// handlers/protected/mod.rs - Protected handlers (any valid JWT)

pub mod whoami;
