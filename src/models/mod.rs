pub mod cab;
pub mod employee;
pub mod lenient;
