pub mod client;
pub mod debounce;
