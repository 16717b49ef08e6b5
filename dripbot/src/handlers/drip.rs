//! The `/drip` skill: faucet disbursement of testnet tokens.
//!
//! Flow for one invocation: validate the requested network, acknowledge,
//! load the supported-network list (cache first, live fetch on miss),
//! resolve the request case-insensitively against that list, call the
//! faucet, and report the outcome. Every terminal state ends with the
//! dispatcher clearing the context's transient memory.

use crate::cache::SUPPORTED_NETWORKS_KEY;
use crate::context::SkillContext;
use crate::error::Result;
use crate::faucet::{NetworkDescriptor, SupportedNetworks};
use crate::skills::{HandlerFuture, ParamSpec, SkillDefinition};
use tracing::{error, warn};

/// Reply when the network parameter is absent or empty.
pub const MSG_INVALID_NETWORK: &str = "Invalid network. Please select a valid option.";
/// First acknowledgment, sent before any lookups.
pub const MSG_FETCHING: &str = "Fetching testnet tokens...";
/// Second acknowledgment, sent once the supported list is loaded.
pub const MSG_PROCESSING: &str =
    "Your testnet tokens are being processed. Please wait a moment for the transaction to process.";
/// Reply when the requested network is not in the supported list.
pub const MSG_NO_FUNDS: &str =
    "The network currently does not have funds provided by web3 api's\nTry again later...";
/// Reply when neither the cache nor a live fetch yields the supported list.
pub const MSG_NETWORKS_UNAVAILABLE: &str =
    "Could not determine the currently supported networks.\nTry again later...";
/// Confirmation preceding the receipt delivery.
pub const MSG_RECEIPT: &str = "Here's your transaction receipt:";

/// Build the `/drip` skill definition.
#[must_use]
pub fn register_skill() -> SkillDefinition {
    SkillDefinition::new("/drip [network] [address]", drip)
        .trigger("/drip")
        .describe("Drip a default amount of testnet tokens to a specified address.")
        .example("/drip base_sepolia 0x123456789")
        .example("/drip base_goerli 0x123456789")
        .param(
            "network",
            ParamSpec::text("base").allow(["base_sepolia", "base_goerli"]),
        )
        .param("address", ParamSpec::address(""))
}

/// Handler entry point for the `/drip` command.
pub fn drip(ctx: &mut SkillContext) -> HandlerFuture<'_> {
    Box::pin(handle(ctx))
}

async fn handle(ctx: &mut SkillContext) -> Result<()> {
    let network = ctx.params().text("network").unwrap_or("").to_string();
    if network.is_empty() {
        ctx.send(MSG_INVALID_NETWORK).await?;
        return Ok(());
    }

    ctx.send(MSG_FETCHING).await?;

    let Some(supported) = load_supported_networks(ctx).await? else {
        ctx.send(MSG_NETWORKS_UNAVAILABLE).await?;
        return Ok(());
    };

    ctx.send(MSG_PROCESSING).await?;

    // The canonical cached networkId goes to the faucet, not the user's
    // raw casing.
    let Some(selected) = supported
        .iter()
        .find(|n| n.network_id.eq_ignore_ascii_case(&network))
    else {
        ctx.send(MSG_NO_FUNDS).await?;
        return Ok(());
    };

    let outcome = ctx
        .faucet()
        .drip_tokens(&selected.network_id, ctx.sender_address())
        .await
        .unwrap_or_else(|e| Err(e.to_string()));

    match outcome {
        Err(err) => {
            ctx.send(&format!(
                "\u{274c} Sorry, there was an error processing your request:\n\n\"{err}\""
            ))
            .await?;
        }
        Ok(receipt) => {
            ctx.send(MSG_RECEIPT).await?;
            ctx.send_receipt(&receipt).await?;
        }
    }

    Ok(())
}

/// Load the supported-network list: cache first, live fetch on miss.
///
/// A hit with a malformed payload is treated like a miss. When the live
/// fetch succeeds its result is written back to the cache; a write failure
/// only degrades the next lookup, so it is logged and swallowed. `Ok(None)`
/// means the list could not be determined at all for this invocation.
async fn load_supported_networks(ctx: &SkillContext) -> Result<Option<Vec<NetworkDescriptor>>> {
    if let Some(raw) = ctx.cache().get(SUPPORTED_NETWORKS_KEY).await? {
        match serde_json::from_str::<SupportedNetworks>(&raw) {
            Ok(payload) => return Ok(Some(payload.supported_networks)),
            Err(e) => {
                warn!(error = %e, "cached supported-networks entry is malformed, refetching");
            }
        }
    }

    match ctx.faucet().supported_networks().await {
        Ok(networks) => {
            let payload = SupportedNetworks {
                supported_networks: networks.clone(),
            };
            let raw = serde_json::to_string(&payload)?;
            if let Err(e) = ctx.cache().set(SUPPORTED_NETWORKS_KEY, &raw).await {
                warn!(error = %e, "failed to repopulate supported-networks cache");
            }
            Ok(Some(networks))
        }
        Err(e) => {
            error!(error = %e, "live supported-networks fetch failed");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryCache};
    use crate::context::{BufferedResponder, Reply};
    use crate::faucet::{DripOutcome, FaucetApi, FaucetError, FaucetResult, Receipt};
    use crate::skills::{ParamValue, ParsedParams, SkillRegistry};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Faucet stub with scripted responses and recorded calls.
    struct ScriptedFaucet {
        /// `None` makes the live networks fetch fail.
        networks: Option<Vec<NetworkDescriptor>>,
        outcome: DripOutcome,
        drip_calls: Mutex<Vec<(String, String)>>,
        network_fetches: Mutex<usize>,
    }

    impl ScriptedFaucet {
        fn new(outcome: DripOutcome) -> Self {
            Self {
                networks: Some(vec![NetworkDescriptor::new("base_sepolia")]),
                outcome,
                drip_calls: Mutex::new(Vec::new()),
                network_fetches: Mutex::new(0),
            }
        }

        fn without_networks(mut self) -> Self {
            self.networks = None;
            self
        }

        fn drip_calls(&self) -> Vec<(String, String)> {
            self.drip_calls.lock().unwrap().clone()
        }

        fn network_fetches(&self) -> usize {
            *self.network_fetches.lock().unwrap()
        }
    }

    #[async_trait]
    impl FaucetApi for ScriptedFaucet {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn supported_networks(&self) -> FaucetResult<Vec<NetworkDescriptor>> {
            *self.network_fetches.lock().unwrap() += 1;
            self.networks
                .clone()
                .ok_or_else(|| FaucetError::Api("networks endpoint down".to_string()))
        }

        async fn drip_tokens(
            &self,
            network_id: &str,
            address: &str,
        ) -> FaucetResult<DripOutcome> {
            self.drip_calls
                .lock()
                .unwrap()
                .push((network_id.to_string(), address.to_string()));
            Ok(self.outcome.clone())
        }
    }

    fn params_for(network: &str, address: &str) -> ParsedParams {
        let mut params = ParsedParams::new();
        params.insert("network", ParamValue::Text(network.to_string()));
        params.insert("address", ParamValue::Address(address.to_string()));
        params
    }

    async fn seed_cache(cache: &MemoryCache, network_ids: &[&str]) {
        let payload = SupportedNetworks {
            supported_networks: network_ids
                .iter()
                .map(|id| NetworkDescriptor::new(*id))
                .collect(),
        };
        cache
            .set(
                SUPPORTED_NETWORKS_KEY,
                &serde_json::to_string(&payload).unwrap(),
            )
            .await
            .unwrap();
    }

    struct Harness {
        responder: Arc<BufferedResponder>,
        cache: Arc<MemoryCache>,
        faucet: Arc<ScriptedFaucet>,
        ctx: SkillContext,
    }

    fn harness(faucet: ScriptedFaucet) -> Harness {
        let responder = Arc::new(BufferedResponder::new());
        let cache = Arc::new(MemoryCache::new());
        let faucet = Arc::new(faucet);
        let responder_dyn: Arc<dyn crate::context::Responder> = responder.clone();
        let cache_dyn: Arc<dyn CacheStore> = cache.clone();
        let faucet_dyn: Arc<dyn FaucetApi> = faucet.clone();
        let ctx = SkillContext::new("0xABC", responder_dyn, cache_dyn, faucet_dyn);
        Harness {
            responder,
            cache,
            faucet,
            ctx,
        }
    }

    #[tokio::test]
    async fn test_empty_network_rejected_before_any_lookup() {
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        h.ctx.set_params(params_for("", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        let replies = h.responder.take().await;
        assert_eq!(replies, vec![Reply::Text(MSG_INVALID_NETWORK.to_string())]);
        assert!(h.faucet.drip_calls().is_empty());
        assert_eq!(h.faucet.network_fetches(), 0);
    }

    #[tokio::test]
    async fn test_absent_network_rejected() {
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        h.ctx.set_params(ParsedParams::new());

        drip(&mut h.ctx).await.unwrap();

        let replies = h.responder.take().await;
        assert_eq!(replies, vec![Reply::Text(MSG_INVALID_NETWORK.to_string())]);
        assert!(h.faucet.drip_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_network_gets_no_funds_message() {
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        seed_cache(&h.cache, &["base_sepolia"]).await;
        h.ctx.set_params(params_for("base_goerli", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        let replies = h.responder.take().await;
        assert_eq!(
            replies,
            vec![
                Reply::Text(MSG_FETCHING.to_string()),
                Reply::Text(MSG_PROCESSING.to_string()),
                Reply::Text(MSG_NO_FUNDS.to_string()),
            ]
        );
        assert!(h.faucet.drip_calls().is_empty());
    }

    #[tokio::test]
    async fn test_case_insensitive_match_uses_canonical_network_id() {
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        seed_cache(&h.cache, &["base_sepolia"]).await;
        h.ctx.set_params(params_for("Base_Sepolia", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        // The faucet saw the cached canonical ID and the sender's address.
        assert_eq!(
            h.faucet.drip_calls(),
            vec![("base_sepolia".to_string(), "0xABC".to_string())]
        );
        // Cache hit, so no live fetch happened.
        assert_eq!(h.faucet.network_fetches(), 0);
    }

    #[tokio::test]
    async fn test_faucet_error_text_surfaces_verbatim() {
        let mut h = harness(ScriptedFaucet::new(Err("insufficient funds".to_string())));
        seed_cache(&h.cache, &["base_sepolia"]).await;
        h.ctx.set_params(params_for("base_sepolia", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        let replies = h.responder.take().await;
        let Some(Reply::Text(last)) = replies.last() else {
            panic!("expected a text reply, got {replies:?}");
        };
        assert!(last.contains("insufficient funds"));
    }

    #[tokio::test]
    async fn test_success_sends_confirmation_then_receipt() {
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        seed_cache(&h.cache, &["base_sepolia"]).await;
        h.ctx.set_params(params_for("base_sepolia", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        let replies = h.responder.take().await;
        assert_eq!(
            replies,
            vec![
                Reply::Text(MSG_FETCHING.to_string()),
                Reply::Text(MSG_PROCESSING.to_string()),
                Reply::Text(MSG_RECEIPT.to_string()),
                Reply::Receipt(Receipt::new("0x1")),
            ]
        );
    }

    #[tokio::test]
    async fn test_full_scenario_via_dispatch_with_cleanup() {
        let registry = SkillRegistry::new(vec![register_skill()]).unwrap();
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        seed_cache(&h.cache, &["base_sepolia"]).await;

        let handled = registry
            .dispatch("/drip base_sepolia 0xABC", &mut h.ctx)
            .await
            .unwrap();
        assert!(handled);

        let replies = h.responder.take().await;
        assert_eq!(
            replies,
            vec![
                Reply::Text(MSG_FETCHING.to_string()),
                Reply::Text(MSG_PROCESSING.to_string()),
                Reply::Text(MSG_RECEIPT.to_string()),
                Reply::Receipt(Receipt::new("0x1")),
            ]
        );
        // Cleanup ran after the handler returned.
        assert!(h.ctx.params().is_empty());
    }

    #[tokio::test]
    async fn test_cache_miss_falls_back_to_live_fetch_and_repopulates() {
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        h.ctx.set_params(params_for("base_sepolia", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        assert_eq!(h.faucet.network_fetches(), 1);
        assert_eq!(h.faucet.drip_calls().len(), 1);

        // The live result was written back under the cache key.
        let raw = h.cache.get(SUPPORTED_NETWORKS_KEY).await.unwrap().unwrap();
        let payload: SupportedNetworks = serde_json::from_str(&raw).unwrap();
        assert_eq!(payload.supported_networks[0].network_id, "base_sepolia");
    }

    #[tokio::test]
    async fn test_malformed_cache_entry_treated_as_miss() {
        let mut h = harness(ScriptedFaucet::new(Ok(Receipt::new("0x1"))));
        h.cache
            .set(SUPPORTED_NETWORKS_KEY, "not json")
            .await
            .unwrap();
        h.ctx.set_params(params_for("base_sepolia", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        assert_eq!(h.faucet.network_fetches(), 1);
        assert_eq!(h.faucet.drip_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_networks_unavailable_when_fallback_fails() {
        let faucet = ScriptedFaucet::new(Ok(Receipt::new("0x1"))).without_networks();
        let mut h = harness(faucet);
        h.ctx.set_params(params_for("base_sepolia", "0x123"));

        drip(&mut h.ctx).await.unwrap();

        let replies = h.responder.take().await;
        assert_eq!(
            replies,
            vec![
                Reply::Text(MSG_FETCHING.to_string()),
                Reply::Text(MSG_NETWORKS_UNAVAILABLE.to_string()),
            ]
        );
        assert!(h.faucet.drip_calls().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_user_error() {
        // Faucet trait errors (as opposed to API-level rejections) also end
        // up embedded in the user-facing error message.
        struct BrokenFaucet;

        #[async_trait]
        impl FaucetApi for BrokenFaucet {
            fn name(&self) -> &'static str {
                "broken"
            }

            async fn supported_networks(&self) -> FaucetResult<Vec<NetworkDescriptor>> {
                Ok(vec![NetworkDescriptor::new("base_sepolia")])
            }

            async fn drip_tokens(
                &self,
                _network_id: &str,
                _address: &str,
            ) -> FaucetResult<DripOutcome> {
                Err(FaucetError::Request("connection reset".to_string()))
            }
        }

        let responder = Arc::new(BufferedResponder::new());
        let responder_dyn: Arc<dyn crate::context::Responder> = responder.clone();
        let mut ctx = SkillContext::new(
            "0xABC",
            responder_dyn,
            Arc::new(MemoryCache::new()),
            Arc::new(BrokenFaucet),
        );
        ctx.set_params(params_for("base_sepolia", "0x123"));

        drip(&mut ctx).await.unwrap();

        let replies = responder.take().await;
        let Some(Reply::Text(last)) = replies.last() else {
            panic!("expected a text reply, got {replies:?}");
        };
        assert!(last.contains("connection reset"));
    }
}
