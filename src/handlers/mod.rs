// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) → Protected (any valid JWT) → Elevated (admin JWT).
// The tier only decides which middleware the router wraps a handler in;
// handlers themselves receive the already-validated caller where needed.
pub mod elevated;
pub mod protected;
pub mod public;
