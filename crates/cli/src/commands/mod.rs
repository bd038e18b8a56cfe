pub mod config;
pub mod next;
pub mod overrides;
pub mod plan;
pub mod repl;
pub mod shifts;
pub mod upcoming;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
