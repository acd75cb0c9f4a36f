//! Domain models for the clinic records.

mod appointment;
mod pet;
mod product;
mod species;
mod veterinarian;

pub use appointment::*;
pub use pet::*;
pub use product::*;
pub use species::*;
pub use veterinarian::*;
