pub mod handler;
pub mod registry;
pub mod state;
#[cfg(test)]
pub mod state_test;
