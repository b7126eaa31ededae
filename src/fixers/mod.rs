pub mod ci;
pub mod composite;
pub mod dotnet;
pub mod maven;
pub mod missing_files;
pub mod pascal;
pub mod patterns;
pub mod readme;
pub mod registry;
pub mod traits;
pub mod vb6;

pub use registry::{default_registry, FixerRegistry, FixerSelection};
pub use traits::{ChangeDescription, Fixer, FixerContext};
