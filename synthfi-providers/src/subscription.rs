//! Wire shapes for the three subscription kinds and the key used to deduplicate
//! concurrent subscribe calls against the same underlying resource.

use serde::Serialize;
use synthfi_core::{Commitment, PublicKey, Signature};

/// Identifies "the same subscription" for the purposes of the mux: two calls that map to
/// an equal `ResourceKey` share a single upstream `*Subscribe` call, the way the original
/// client kept `_pendingAccountSubscriptions`/`_accountToCallback` keyed by
/// `(PublicKey, Commitment)` rather than one entry per caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Account(PublicKey, Commitment),
    Signature(Signature, Commitment),
    Slot,
}

impl ResourceKey {
    pub(crate) fn subscribe_method(&self) -> &'static str {
        match self {
            ResourceKey::Account(..) => "accountSubscribe",
            ResourceKey::Signature(..) => "signatureSubscribe",
            ResourceKey::Slot => "slotSubscribe",
        }
    }

    pub(crate) fn unsubscribe_method(&self) -> &'static str {
        match self {
            ResourceKey::Account(..) => "accountUnsubscribe",
            ResourceKey::Signature(..) => "signatureUnsubscribe",
            ResourceKey::Slot => "slotUnsubscribe",
        }
    }

    /// True for subscriptions that the server terminates itself after exactly one
    /// notification: the mux must not send an `unsubscribe` for these once the
    /// notification has already arrived, since the server has already dropped it.
    pub(crate) fn self_terminating(&self) -> bool {
        matches!(self, ResourceKey::Signature(..))
    }

    pub(crate) fn subscribe_params(&self) -> serde_json::Value {
        match self {
            ResourceKey::Account(key, commitment) => serde_json::json!([
                key.to_string(),
                { "commitment": commitment, "encoding": "base64" }
            ]),
            ResourceKey::Signature(sig, commitment) => serde_json::json!([
                sig.to_string(),
                { "commitment": commitment }
            ]),
            ResourceKey::Slot => serde_json::json!([]),
        }
    }

    pub(crate) fn unsubscribe_params(&self, server_id: u64) -> serde_json::Value {
        serde_json::json!([server_id])
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SlotNotification {
    pub parent: u64,
    pub root: u64,
    pub slot: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SignatureNotification {
    /// `None` when the transaction landed without error.
    pub err: Option<String>,
}

impl<'de> serde::Deserialize<'de> for SignatureNotification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Same `{context, value}` envelope as accountNotification; the error itself
        // lives at `value.err`, absent and JSON `null` both meaning success.
        #[derive(serde::Deserialize)]
        struct Raw {
            value: Value,
        }
        #[derive(serde::Deserialize)]
        struct Value {
            #[serde(default)]
            err: Option<serde_json::Value>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(SignatureNotification {
            err: raw.value.err.map(|v| v.to_string()),
        })
    }
}

impl<'de> serde::Deserialize<'de> for SlotNotification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            parent: u64,
            root: u64,
            slot: u64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(SlotNotification { parent: raw.parent, root: raw.root, slot: raw.slot })
    }
}
