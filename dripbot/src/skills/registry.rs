//! Skill definitions and the dispatch registry.
//!
//! A [`SkillDefinition`] pairs a slash-command pattern (with `[name]`
//! placeholders) with typed parameter specs, usage metadata, and a handler.
//! The [`SkillRegistry`] owns a fixed set of definitions for the process
//! lifetime, validates them once at construction, and resolves incoming
//! text into a handler plus already-coerced parameters.

use super::params::{ParamKind, ParamSpec, ParsedParams};
use crate::context::SkillContext;
use crate::error::{Result, SkillError, SkillResult};
use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Boxed future returned by a skill handler.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A skill handler entry point.
pub type SkillHandler = for<'a> fn(&'a mut SkillContext) -> HandlerFuture<'a>;

/// A registered slash-command skill.
#[derive(Debug, Clone)]
pub struct SkillDefinition {
    /// Command pattern with positional placeholders, e.g.
    /// `/drip [network] [address]`.
    pub command: String,
    /// Trigger strings matched against the first token of incoming text.
    pub triggers: Vec<String>,
    /// Ordered parameter specifications, positionally matched against the
    /// pattern's placeholders.
    pub params: Vec<(String, ParamSpec)>,
    /// One-line description for help text.
    pub description: String,
    /// Example invocations for help text.
    pub examples: Vec<String>,
    /// Handler invoked on a matched command.
    pub handler: SkillHandler,
}

impl SkillDefinition {
    /// Create a definition for the given command pattern and handler.
    pub fn new(command: impl Into<String>, handler: SkillHandler) -> Self {
        Self {
            command: command.into(),
            triggers: Vec::new(),
            params: Vec::new(),
            description: String::new(),
            examples: Vec::new(),
            handler,
        }
    }

    /// Add a trigger string.
    #[must_use]
    pub fn trigger(mut self, trigger: impl Into<String>) -> Self {
        self.triggers.push(trigger.into());
        self
    }

    /// Declare the next positional parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.params.push((name.into(), spec));
        self
    }

    /// Set the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an example invocation.
    #[must_use]
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Placeholder names in the command pattern, in order.
    fn placeholders(&self) -> Vec<&str> {
        self.command
            .split_whitespace()
            .filter_map(|tok| tok.strip_prefix('[').and_then(|t| t.strip_suffix(']')))
            .collect()
    }

    /// Validate this definition. Called once at registry construction.
    fn validate(&self) -> SkillResult<()> {
        if self.triggers.is_empty() {
            return Err(SkillError::invalid(&self.command, "no triggers declared"));
        }
        for trigger in &self.triggers {
            if !trigger.starts_with('/') {
                return Err(SkillError::invalid(
                    &self.command,
                    format!("trigger {trigger:?} must start with '/'"),
                ));
            }
        }

        let placeholders = self.placeholders();
        let names: Vec<&str> = self.params.iter().map(|(n, _)| n.as_str()).collect();
        if placeholders != names {
            return Err(SkillError::invalid(
                &self.command,
                format!("placeholders {placeholders:?} do not match params {names:?}"),
            ));
        }

        for (name, spec) in &self.params {
            if spec.allowed.is_some() && spec.kind == ParamKind::Number {
                return Err(SkillError::invalid(
                    &self.command,
                    format!("param {name:?}: allow-lists apply to textual kinds only"),
                ));
            }
        }

        Ok(())
    }

    /// Coerce the tokens following the trigger into parameters.
    fn parse_params<'t>(&self, mut tokens: impl Iterator<Item = &'t str>) -> ParsedParams {
        let mut params = ParsedParams::new();
        for (name, spec) in &self.params {
            if let Some(value) = spec.coerce(tokens.next()) {
                params.insert(name.clone(), value);
            }
        }
        params
    }
}

/// Registry of all skills known to the bot.
///
/// The set is fixed per process: constructed once at startup, read-only
/// thereafter.
#[derive(Debug)]
pub struct SkillRegistry {
    skills: Vec<SkillDefinition>,
}

impl SkillRegistry {
    /// Build a registry, validating every definition.
    pub fn new(skills: Vec<SkillDefinition>) -> SkillResult<Self> {
        let mut seen = Vec::new();
        for skill in &skills {
            skill.validate()?;
            for trigger in &skill.triggers {
                let lowered = trigger.to_lowercase();
                if seen.contains(&lowered) {
                    return Err(SkillError::DuplicateTrigger(trigger.clone()));
                }
                seen.push(lowered);
            }
        }
        debug!(count = skills.len(), "skill registry constructed");
        Ok(Self { skills })
    }

    /// The registered skills, in registration order.
    #[must_use]
    pub fn skills(&self) -> &[SkillDefinition] {
        &self.skills
    }

    /// Resolve incoming text to a skill and its coerced parameters.
    ///
    /// Returns `None` when the first token matches no trigger.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<(&SkillDefinition, ParsedParams)> {
        let mut tokens = text.split_whitespace();
        let trigger = tokens.next()?;

        let skill = self.skills.iter().find(|s| {
            s.triggers
                .iter()
                .any(|t| t.eq_ignore_ascii_case(trigger))
        })?;

        let params = skill.parse_params(tokens);
        Some((skill, params))
    }

    /// Dispatch incoming text through the matching skill.
    ///
    /// Installs the parsed parameters on the context, runs the handler, and
    /// clears the context's transient memory afterwards on every exit path.
    /// Returns `Ok(false)` when no skill matched.
    pub async fn dispatch(&self, text: &str, ctx: &mut SkillContext) -> Result<bool> {
        let Some((skill, params)) = self.resolve(text) else {
            warn!(text = %text, "no skill matched");
            return Ok(false);
        };

        debug!(command = %skill.command, "dispatching skill");
        ctx.set_params(params);
        let result = (skill.handler)(ctx).await;
        ctx.clear_memory();
        result.map(|()| true)
    }

    /// Render usage metadata for all skills.
    #[must_use]
    pub fn help_text(&self) -> String {
        let mut out = String::new();
        for skill in &self.skills {
            let _ = writeln!(out, "{} - {}", skill.command, skill.description);
            for example in &skill.examples {
                let _ = writeln!(out, "    e.g. {example}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::context::{BufferedResponder, Reply};
    use crate::faucet::{DripOutcome, FaucetApi, FaucetResult, NetworkDescriptor};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NullFaucet;

    #[async_trait]
    impl FaucetApi for NullFaucet {
        fn name(&self) -> &'static str {
            "null"
        }

        async fn supported_networks(&self) -> FaucetResult<Vec<NetworkDescriptor>> {
            Ok(vec![])
        }

        async fn drip_tokens(&self, _network_id: &str, _address: &str) -> FaucetResult<DripOutcome> {
            Ok(Err("unused".to_string()))
        }
    }

    fn echo_handler(ctx: &mut SkillContext) -> HandlerFuture<'_> {
        Box::pin(async move {
            let network = ctx.params().text("network").unwrap_or("?").to_string();
            ctx.send(&network).await?;
            ctx.remember("dispatched", serde_json::json!(true));
            Ok(())
        })
    }

    fn drip_definition() -> SkillDefinition {
        SkillDefinition::new("/drip [network] [address]", echo_handler)
            .trigger("/drip")
            .describe("Drip a default amount of testnet tokens to a specified address.")
            .example("/drip base_sepolia 0x123456789")
            .param(
                "network",
                ParamSpec::text("base").allow(["base_sepolia", "base_goerli"]),
            )
            .param("address", ParamSpec::address(""))
    }

    fn test_context(responder: Arc<BufferedResponder>) -> SkillContext {
        SkillContext::new(
            "0xABC",
            responder,
            Arc::new(MemoryCache::new()),
            Arc::new(NullFaucet),
        )
    }

    #[test]
    fn test_registry_construction() {
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();
        assert_eq!(registry.skills().len(), 1);
    }

    #[test]
    fn test_placeholder_mismatch_rejected() {
        let bad = SkillDefinition::new("/drip [network] [address]", echo_handler)
            .trigger("/drip")
            .param("network", ParamSpec::text("base"));

        let err = SkillRegistry::new(vec![bad]).unwrap_err();
        assert!(matches!(err, SkillError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_missing_trigger_rejected() {
        let bad = SkillDefinition::new("/show", echo_handler);
        let err = SkillRegistry::new(vec![bad]).unwrap_err();
        assert!(matches!(err, SkillError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_duplicate_trigger_rejected() {
        let a = SkillDefinition::new("/show", echo_handler).trigger("/show");
        let b = SkillDefinition::new("/show", echo_handler).trigger("/Show");
        let err = SkillRegistry::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, SkillError::DuplicateTrigger(_)));
    }

    #[test]
    fn test_number_allow_list_rejected() {
        let bad = SkillDefinition::new("/mint [token_id]", echo_handler)
            .trigger("/mint")
            .param("token_id", ParamSpec::number(1.0).allow(["1", "2"]));
        let err = SkillRegistry::new(vec![bad]).unwrap_err();
        assert!(matches!(err, SkillError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_default_outside_allow_list_accepted() {
        // The drip skill's own default ("base") is not in its allow-list;
        // construction accepts it, and a disallowed token at dispatch falls
        // back to it rather than failing.
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();

        let (_, params) = registry.resolve("/drip polygon 0x123").unwrap();
        assert_eq!(params.text("network"), Some("base"));
    }

    #[test]
    fn test_resolve_case_insensitive_trigger() {
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();

        let (skill, params) = registry.resolve("/DRIP base_sepolia 0x123").unwrap();
        assert_eq!(skill.command, "/drip [network] [address]");
        assert_eq!(params.text("network"), Some("base_sepolia"));
        assert_eq!(params.text("address"), Some("0x123"));
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();

        let (_, params) = registry.resolve("/drip").unwrap();
        assert_eq!(params.text("network"), Some("base"));
        assert_eq!(params.text("address"), Some(""));

        // Disallowed network falls back to the default.
        let (_, params) = registry.resolve("/drip polygon 0x123").unwrap();
        assert_eq!(params.text("network"), Some("base"));
    }

    #[test]
    fn test_resolve_unknown_command() {
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();
        assert!(registry.resolve("/unknown").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[tokio::test]
    async fn test_dispatch_runs_handler_and_clears_memory() {
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();
        let responder = Arc::new(BufferedResponder::new());
        let mut ctx = test_context(Arc::clone(&responder));

        let handled = registry
            .dispatch("/drip base_sepolia 0x123", &mut ctx)
            .await
            .unwrap();
        assert!(handled);

        let replies = responder.take().await;
        assert_eq!(replies, vec![Reply::Text("base_sepolia".to_string())]);

        // Transient memory and params were cleared by the dispatcher.
        assert!(ctx.recall("dispatched").is_none());
        assert!(ctx.params().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unmatched_returns_false() {
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();
        let mut ctx = test_context(Arc::new(BufferedResponder::new()));

        let handled = registry.dispatch("hello there", &mut ctx).await.unwrap();
        assert!(!handled);
    }

    #[test]
    fn test_help_text() {
        let registry = SkillRegistry::new(vec![drip_definition()]).unwrap();
        let help = registry.help_text();
        assert!(help.contains("/drip [network] [address]"));
        assert!(help.contains("e.g. /drip base_sepolia 0x123456789"));
    }
}
