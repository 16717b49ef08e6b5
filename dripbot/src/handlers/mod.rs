//! Skill handlers.
//!
//! Each submodule implements one slash-command skill and exposes a
//! `register_skill` constructor for its
//! [`SkillDefinition`](crate::skills::SkillDefinition).

pub mod drip;

use crate::error::SkillResult;
use crate::skills::SkillRegistry;

/// Build the registry with every skill this bot ships.
pub fn default_registry() -> SkillResult<SkillRegistry> {
    SkillRegistry::new(vec![drip::register_skill()])
}
