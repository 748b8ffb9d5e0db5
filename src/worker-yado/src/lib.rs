pub mod work;

pub use work::{analyze_unit, generate_unit};
