mod substrate;

pub use substrate::*;
