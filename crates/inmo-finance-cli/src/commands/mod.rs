pub mod market;
pub mod roi;
pub mod uva;
