pub mod tag;
pub mod value;

pub use tag::TagKey;
pub use value::{Value, ValueFn};

#[cfg(test)]
mod value_test;
