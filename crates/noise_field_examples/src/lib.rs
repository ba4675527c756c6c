#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{render_field_to_png, render_fields_side_by_side};
