// Rules module
// - color.rs: named color regions used by font color and highlight checks
// - engine.rs: RuleEngine, one comparison rule per CheckKind

pub mod color;
pub mod engine;

pub use color::{is_in_range, ColorTarget};
pub use engine::*;
