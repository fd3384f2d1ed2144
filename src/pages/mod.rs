pub mod home;
pub mod node;
pub mod not_found;
