pub mod solver;

pub use solver::{Contact, Solver};
