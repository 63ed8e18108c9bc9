//! Filter widgets

pub mod check_list;
pub mod range_slider;

pub use check_list::{column_filter, set_filter};
pub use range_slider::range_slider;
