pub mod detector;

pub use detector::{ProjectDetector, ProjectKind};
