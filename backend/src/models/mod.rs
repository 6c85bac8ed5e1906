//! Domain types shared by the repository and HTTP layers.

pub mod todo;

pub use todo::*;
