pub mod migrate;
pub mod ping;
pub mod role;
pub mod token;
