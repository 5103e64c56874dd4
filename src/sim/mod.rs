pub mod event;
pub mod session;
