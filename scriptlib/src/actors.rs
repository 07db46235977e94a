pub mod controller;
pub mod worker;
