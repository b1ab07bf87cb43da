//! Descriptor-driven parameter controls.

pub mod compiler;
pub mod descriptor;
pub mod session;
pub mod tree;
pub mod value;

pub use compiler::{
    unchanged, ChangeOutcome, ControlState, ControlStatus, OnChange, ParameterDescriptorCompiler,
    ValueMap, MAX_CASCADE_DEPTH,
};
pub use descriptor::{ControlKind, NumericRange};
pub use session::SessionContext;
pub use value::{ControlValue, DashPattern, FontSpec, Point, Rgba};
