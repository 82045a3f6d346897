pub mod account;
pub mod budget;
pub mod general;
pub mod loans;
pub mod salary;
pub mod summary;
