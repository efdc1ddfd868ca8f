pub mod aggregate;
pub mod common_io;
pub mod edge_table;
pub mod errors;
pub mod expression;
pub mod partition;

pub type Mat = nalgebra::DMatrix<f64>;
