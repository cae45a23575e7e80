pub mod pagination;

pub use pagination::{check_fit, fits, FitAnalysis, EPSILON};
