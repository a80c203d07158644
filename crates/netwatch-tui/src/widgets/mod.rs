//! Small reusable rendering helpers shared by the screens.

pub mod bytes_fmt;
