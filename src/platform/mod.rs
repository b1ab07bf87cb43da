//! Console surface implementations.

#[cfg(unix)]
pub mod process_terminal;
pub mod virtual_surface;

#[cfg(unix)]
pub use process_terminal::ProcessTerminal;
pub use virtual_surface::VirtualSurface;
