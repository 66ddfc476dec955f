pub use {machine::*, model::*, search::*, solution::*, util::*};

pub mod machine;
pub mod model;
pub mod search;
pub mod solution;

mod util;
