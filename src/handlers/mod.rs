pub mod acquisition;
pub mod charts;
pub mod render;
