//! Slash-command skills.
//!
//! A skill is a registered command pattern plus its handler and parameter
//! metadata. The registry owns the fixed set of skills for the process
//! lifetime and dispatches incoming text to the matching handler.

mod params;
mod registry;

pub use params::{ParamKind, ParamSpec, ParamValue, ParsedParams};
pub use registry::{HandlerFuture, SkillDefinition, SkillHandler, SkillRegistry};
