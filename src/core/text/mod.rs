//! Text helpers (printable classification, width calculations).

pub mod width;
