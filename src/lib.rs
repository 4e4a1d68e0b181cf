// Library root: exposes the bootstrap steps for integration tests.
// The binary entry point is src/main.rs.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod launch;
pub mod logger;
pub mod node;
pub mod sphere;

#[cfg(test)]
mod test_support;
