pub mod check;
pub mod ensemble;
