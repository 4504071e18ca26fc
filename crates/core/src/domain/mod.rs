pub mod budget;
pub mod reportee;
pub mod request;
pub mod session;
