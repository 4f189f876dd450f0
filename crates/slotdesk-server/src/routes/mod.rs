pub mod auth;
pub mod events;
pub mod nav;
pub mod slots;
