pub mod fetcher;
pub mod http;
pub mod install;
pub mod platform;
pub mod release;
