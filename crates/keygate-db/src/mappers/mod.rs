//! Model to entity mappers
//!
//! Conversions from database models to the domain entities defined in
//! keygate-core. All writes go through explicit repository arguments, so
//! only the read direction needs mapping.

mod token;
mod user;
