//! Element tree → markup source. The inverse of `jsxlab_parser::parse`:
//! `parse(generate(tree))` yields a tree structurally equal to `tree`.

mod context;
mod generator;

pub use context::{GenerateOptions, GeneratorContext};
pub use generator::{format_attribute, generate, generate_module, generate_with_options};
