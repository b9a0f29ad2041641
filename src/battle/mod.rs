pub mod ai;
pub mod calculators;
pub mod commands;
pub mod engine;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod turn_order;
pub mod validation;

#[cfg(test)]
mod tests;
