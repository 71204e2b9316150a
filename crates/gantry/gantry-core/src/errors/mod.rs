//! Error handling for gantry.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod label_error;

pub use label_error::LabelError;
