//! Submission and outcome verification.
//!
//! ```text
//! Built ─sign─► Signed ─submit_and_watch─► Included(block) ─events─► Verified
//! ```
//!
//! Inclusion is not success. The chain includes calls that then fail in
//! dispatch, so after inclusion the block's event log is read back and the
//! signer's extrinsic is located through its `TransactionFeePaid` event. The
//! terminal event at the same extrinsic index decides the outcome. When that
//! verdict is missing or ambiguous the call fails closed.

use parity_scale_codec::Encode;
use serde::{Deserialize, Serialize};

use super::builder::Call;
use crate::chain::{
    BlockHash, ChainConnection, ChainEvent, DispatchFailure, EventRecord, Identity, Metadata,
    Phase,
};
use crate::error::{Result, SubstrateError};
use crate::types::AccountId;

// ---------------------------------------------------------------------------
// SignedExtrinsic
// ---------------------------------------------------------------------------

/// A call together with its signer and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedExtrinsic {
    pub signer: AccountId,
    pub call: Call,
    #[serde(with = "hex_signature")]
    pub signature: Vec<u8>,
}

impl SignedExtrinsic {
    /// Signs the encoded call with `identity`.
    pub fn sign(call: Call, identity: &dyn Identity) -> Result<Self> {
        let signature = identity
            .sign(&call.encode())
            .map_err(SubstrateError::chain(format!("sign {}", call.name())))?;
        Ok(Self {
            signer: identity.account_id(),
            call,
            signature,
        })
    }

    /// `signer ++ compact(len) ++ signature ++ call`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.signer.encode_to(&mut out);
        self.signature.encode_to(&mut out);
        out.extend_from_slice(&self.call.encode());
        out
    }
}

mod hex_signature {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Verdict for the signer's extrinsic in one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failed(DispatchFailure),
    /// No terminal event for the signer, or conflicting ones.
    Indeterminate,
}

/// What [`submit`] observed: the including block and its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inclusion {
    pub call: String,
    pub block: BlockHash,
    pub outcome: Outcome,
}

/// Reduces a block's event log to the verdict for `signer`'s extrinsic.
///
/// Extrinsics are attributed to the signer by the `TransactionFeePaid`
/// event emitted in their phase. If the signer has several extrinsics in
/// the block, they must all agree.
pub fn inspect_events(events: &[EventRecord], signer: &AccountId) -> Outcome {
    let mine: Vec<u32> = events
        .iter()
        .filter_map(|record| match (&record.phase, &record.event) {
            (Phase::ApplyExtrinsic(index), ChainEvent::TransactionFeePaid { who, .. })
                if who == signer =>
            {
                Some(*index)
            }
            _ => None,
        })
        .collect();

    if mine.is_empty() {
        return Outcome::Indeterminate;
    }

    let mut verdict: Option<Outcome> = None;
    for index in mine {
        let terminal = events.iter().find_map(|record| match (&record.phase, &record.event) {
            (Phase::ApplyExtrinsic(i), ChainEvent::ExtrinsicSuccess) if *i == index => {
                Some(Outcome::Success)
            }
            (Phase::ApplyExtrinsic(i), ChainEvent::ExtrinsicFailed(failure)) if *i == index => {
                Some(Outcome::Failed(failure.clone()))
            }
            _ => None,
        });

        match (terminal, &verdict) {
            (None, _) => return Outcome::Indeterminate,
            (Some(outcome), None) => verdict = Some(outcome),
            (Some(outcome), Some(previous)) if &outcome == previous => {}
            (Some(_), Some(_)) => return Outcome::Indeterminate,
        }
    }

    verdict.unwrap_or(Outcome::Indeterminate)
}

/// Turns an [`Inclusion`] into `Ok(block)` or the matching error.
pub fn verify_outcome(metadata: &dyn Metadata, inclusion: Inclusion) -> Result<BlockHash> {
    let Inclusion {
        call,
        block,
        outcome,
    } = inclusion;

    match outcome {
        Outcome::Success => {
            tracing::debug!(call = %call, block = %block, "extrinsic verified");
            Ok(block)
        }
        Outcome::Failed(DispatchFailure::Module { index, error }) => {
            let (module, name) = match metadata.module_error(index, error) {
                Some(info) => (info.module, info.error),
                None => ("unknown".to_string(), "unknown".to_string()),
            };
            tracing::warn!(
                call = %call,
                block = %block,
                module = %module,
                error = %name,
                module_index = index,
                error_index = error,
                "extrinsic dispatch failed"
            );
            Err(SubstrateError::Dispatch {
                call,
                module_index: index,
                error_index: error,
                module,
                error: name,
            })
        }
        Outcome::Failed(other) => {
            tracing::warn!(call = %call, block = %block, reason = %other, "extrinsic rejected");
            Err(SubstrateError::DispatchRejected {
                call,
                reason: other.to_string(),
            })
        }
        Outcome::Indeterminate => {
            tracing::warn!(call = %call, block = %block, "no dispatch outcome for signer");
            Err(SubstrateError::IndeterminateOutcome { call, block })
        }
    }
}

/// Signs and submits `call`, waits for inclusion and reads the verdict.
///
/// Does not interpret the verdict; see [`verify_outcome`] and [`execute`].
pub fn submit<C: ChainConnection + ?Sized>(
    connection: &C,
    identity: &dyn Identity,
    call: Call,
) -> Result<Inclusion> {
    let name = call.name();
    let signer = identity.account_id();

    let extrinsic = SignedExtrinsic::sign(call, identity)?;
    tracing::debug!(call = %name, signer = %signer, "extrinsic signed");

    let block = connection
        .submit_and_watch(&extrinsic)
        .map_err(SubstrateError::chain(format!("submit {name}")))?;
    tracing::debug!(call = %name, block = %block, "extrinsic included");

    let events = connection
        .block_events(&block)
        .map_err(SubstrateError::chain(format!("read events of {name}")))?;
    let outcome = inspect_events(&events, &signer);

    Ok(Inclusion {
        call: name,
        block,
        outcome,
    })
}

/// Submits `call` and fails unless the chain reports success for it.
pub fn execute<C: ChainConnection + ?Sized>(
    connection: &C,
    identity: &dyn Identity,
    call: Call,
) -> Result<BlockHash> {
    let inclusion = submit(connection, identity, call)?;
    verify_outcome(connection.metadata(), inclusion)
}
