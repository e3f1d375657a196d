pub mod cobertura;
pub mod emit;
pub mod error;
pub mod locate;
pub mod mapper;
pub mod profile;
pub mod run;
pub mod structure;

#[cfg(test)]
mod mapper_test;
