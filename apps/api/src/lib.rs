pub mod artifacts;
pub mod client;
pub mod config;
pub mod errors;
pub mod prediction;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;
