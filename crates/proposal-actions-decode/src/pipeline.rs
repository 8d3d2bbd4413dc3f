//! End-to-end proposal decoding
//!
//! validate chain -> split -> resolve unknown selectors -> decode each call.
//! The signature lookup is the only suspension point.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{hex, Address};
use tokio::task::JoinHandle;

use proposal_actions_core::{
    network, ActionMetaTable, DecodeOutcome, ProposalActions, ProposalRecord, SignatureSource,
};

use super::decode_log;
use super::decoder::Decoder;
use super::splitter::split;

/// Decode every action embedded in `proposal`.
///
/// Returns [`DecodeOutcome::NotReady`] when `chain_id` is not a supported
/// network. Otherwise never fails: undecodable calls become error entries.
pub async fn decode_proposal_actions<S: SignatureSource>(
    decoder: &Decoder,
    source: &S,
    chain_id: &str,
    proposal: &ProposalRecord,
    meta_table: Option<&ActionMetaTable>,
) -> DecodeOutcome {
    let network = match network(chain_id) {
        Ok(network) => network,
        Err(e) => {
            tracing::warn!(proposal = %proposal.proposal_id, "not decoding: {e}");
            return DecodeOutcome::NotReady;
        }
    };

    let actions_meta = meta_table
        .and_then(|table| table.get(&proposal.proposal_type))
        .map(|meta| meta.actions.as_slice());

    let calls = split(
        network,
        &proposal.proposal_data,
        proposal.target.unwrap_or(Address::ZERO),
        actions_meta,
    );

    // Unique selectors the registry cannot resolve
    let unknown: Vec<String> = calls
        .iter()
        .filter_map(|(call, _)| call.selector())
        .filter(|selector| !decoder.registry().contains(selector))
        .map(|selector| format!("0x{}", hex::encode(selector)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let decoder = if unknown.is_empty() {
        decoder.clone()
    } else {
        decode_log!("resolving {} unknown selectors", unknown.len());
        match source.lookup_signatures(&unknown).await {
            Ok(signatures) => decoder.with_signatures(&signatures),
            Err(e) => {
                tracing::warn!("signature lookup failed, decoding with known signatures: {e}");
                decoder.clone()
            }
        }
    };

    let actions = calls
        .iter()
        .map(|(call, meta)| decoder.decode(network, call, *meta))
        .collect();

    let actions = ProposalActions::new(actions);
    tracing::info!(
        proposal = %proposal.proposal_id,
        network = network.name,
        actions = actions.actions.len(),
        had_decode_error = actions.had_decode_error,
        "decoded proposal actions"
    );
    DecodeOutcome::Ready(actions)
}

/// Decoder, signature source and metadata bundled for repeated use.
pub struct ActionPipeline<S> {
    decoder: Decoder,
    source: Arc<S>,
    meta_table: Arc<ActionMetaTable>,
}

impl<S> Clone for ActionPipeline<S> {
    fn clone(&self) -> Self {
        Self {
            decoder: self.decoder.clone(),
            source: Arc::clone(&self.source),
            meta_table: Arc::clone(&self.meta_table),
        }
    }
}

impl<S: SignatureSource> ActionPipeline<S> {
    pub fn new(decoder: Decoder, source: S, meta_table: ActionMetaTable) -> Self {
        Self {
            decoder,
            source: Arc::new(source),
            meta_table: Arc::new(meta_table),
        }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn meta_table(&self) -> &ActionMetaTable {
        &self.meta_table
    }

    pub async fn decode(&self, chain_id: &str, proposal: &ProposalRecord) -> DecodeOutcome {
        decode_proposal_actions(
            &self.decoder,
            self.source.as_ref(),
            chain_id,
            proposal,
            Some(&self.meta_table),
        )
        .await
    }
}

/// Result of a load, tagged with the generation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedActions {
    pub generation: u64,
    pub proposal_id: String,
    pub outcome: DecodeOutcome,
}

/// Runs decodes in the background and keeps only the latest one.
///
/// Each [`load`](Self::load) or [`cancel`](Self::cancel) starts a new
/// generation; results from older generations are dropped on completion.
pub struct ActionLoader<S> {
    pipeline: ActionPipeline<S>,
    generation: Arc<AtomicU64>,
    result: Arc<Mutex<Option<LoadedActions>>>,
}

impl<S: SignatureSource + 'static> ActionLoader<S> {
    pub fn new(pipeline: ActionPipeline<S>) -> Self {
        Self {
            pipeline,
            generation: Arc::new(AtomicU64::new(0)),
            result: Arc::new(Mutex::new(None)),
        }
    }

    /// Start decoding `proposal`. The handle resolves to whether the result
    /// was applied (false when superseded).
    pub fn load(&self, chain_id: impl Into<String>, proposal: ProposalRecord) -> JoinHandle<bool> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let chain_id = chain_id.into();
        let pipeline = self.pipeline.clone();
        let current = Arc::clone(&self.generation);
        let result = Arc::clone(&self.result);

        tokio::spawn(async move {
            let outcome = pipeline.decode(&chain_id, &proposal).await;

            let mut slot = match result.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Checked under the lock so a concurrent cancel cannot interleave
            if current.load(Ordering::SeqCst) != generation {
                decode_log!(
                    "dropping stale result for {} (generation {})",
                    proposal.proposal_id,
                    generation
                );
                return false;
            }
            *slot = Some(LoadedActions {
                generation,
                proposal_id: proposal.proposal_id,
                outcome,
            });
            true
        })
    }

    /// Discard any in-flight load and clear the last result.
    pub fn cancel(&self) {
        let mut slot = match self.result.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.generation.fetch_add(1, Ordering::SeqCst);
        *slot = None;
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Latest applied result, if any.
    pub fn latest(&self) -> Option<LoadedActions> {
        match self.result.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
