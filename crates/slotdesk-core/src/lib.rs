pub mod clipboard;
pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod guard;
pub mod io;
pub mod nav;
pub mod notify;
pub mod paths;
pub mod route;
pub mod session;
pub mod store;
pub mod types;

pub use error::{Result, SlotError};
