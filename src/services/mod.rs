pub mod budget;
pub mod bus;
pub mod classification;
pub mod live;
pub mod loans;
pub mod salary;
pub mod summary;
