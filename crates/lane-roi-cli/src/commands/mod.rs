pub mod roi;
pub mod worksheets;
