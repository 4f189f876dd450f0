pub mod config;
pub mod init;
pub mod serve;
pub mod slots;
pub mod user;
