//! The JSON-RPC 2.0 envelope used by both the HTTP client and the websocket subscription
//! transport. `Response` distinguishes a plain success/error reply from a subscription
//! notification by hand, the same way ethers' `rpc::transports::common::Response` and
//! `ws::types::PubSubItem` do it: a notification carries `method`/`params` and no `id`,
//! a reply carries `id` and either `result` or `error`.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A JSON-RPC request. `id` is set by the caller (`RpcCorrelator` in `synthfi-providers`);
/// `params` is omitted entirely when it serializes to an empty array, matching the
/// Solana node's tolerance for parameterless calls like `slotSubscribe`.
#[derive(Clone, Debug, Serialize)]
pub struct Request<'a, T> {
    pub id: u64,
    pub jsonrpc: &'a str,
    pub method: &'a str,
    pub params: T,
}

impl<'a, T: Serialize> Request<'a, T> {
    pub fn new(id: u64, method: &'a str, params: T) -> Self {
        Self { id, jsonrpc: "2.0", method, params }
    }
}

/// A server-reported JSON-RPC error.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(code: {}, message: {}", self.code, self.message)?;
        if let Some(data) = &self.data {
            write!(f, ", data: {data}")?;
        }
        write!(f, ")")
    }
}

/// An unsolicited `method`+`params` push carrying a subscription id inside `params.subscription`,
/// as distinct from a solicited reply to a request `id`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Notification<R> {
    pub subscription: u64,
    pub result: R,
}

/// A deserialized JSON-RPC message: either a reply to a request we sent, or a subscription
/// notification pushed by the server. Parsing this requires a hand-rolled `Visitor` because
/// `serde_json` cannot pick the right variant from `#[serde(untagged)]` alone once both
/// branches share field names loosely (`result` appears in both success replies and, nested,
/// inside notifications) — see `ethers-providers`'s `ws::types::PubSubItem` for the same
/// problem on the Ethereum side.
#[derive(Debug)]
pub enum Response<R> {
    Success { id: u64, result: R },
    Error { id: u64, error: JsonRpcError },
    Notification { method: String, params: Notification<R> },
}

impl<'de, R> Deserialize<'de> for Response<R>
where
    R: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ResponseVisitor<R>(PhantomData<R>);

        impl<'de, R> Visitor<'de> for ResponseVisitor<R>
        where
            R: Deserialize<'de>,
        {
            type Value = Response<R>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON-RPC response or subscription notification")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut id: Option<u64> = None;
                let mut method: Option<String> = None;
                let mut result: Option<serde_json::Value> = None;
                let mut error: Option<JsonRpcError> = None;
                let mut params: Option<serde_json::Value> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "id" => id = Some(map.next_value()?),
                        "method" => method = Some(map.next_value()?),
                        "result" => result = Some(map.next_value()?),
                        "error" => error = Some(map.next_value()?),
                        "params" => params = Some(map.next_value()?),
                        // jsonrpc version tag and anything else we don't care about.
                        _ => {
                            let _: de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                if let Some(method) = method {
                    let params = params.ok_or_else(|| de::Error::missing_field("params"))?;
                    let params: Notification<R> =
                        serde_json::from_value(params).map_err(de::Error::custom)?;
                    return Ok(Response::Notification { method, params });
                }

                let id = id.ok_or_else(|| de::Error::missing_field("id"))?;
                if let Some(error) = error {
                    return Ok(Response::Error { id, error });
                }
                let result = result.ok_or_else(|| de::Error::missing_field("result"))?;
                let result: R = serde_json::from_value(result).map_err(de::Error::custom)?;
                Ok(Response::Success { id, result })
            }
        }

        deserializer.deserialize_map(ResponseVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deser_success() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":42}"#;
        let resp: Response<u64> = serde_json::from_str(raw).unwrap();
        match resp {
            Response::Success { id, result } => {
                assert_eq!(id, 1);
                assert_eq!(result, 42);
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn deser_error() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32600,"message":"bad request"}}"#;
        let resp: Response<u64> = serde_json::from_str(raw).unwrap();
        match resp {
            Response::Error { id, error } => {
                assert_eq!(id, 1);
                assert_eq!(error.code, -32600);
            }
            _ => panic!("expected error"),
        }
    }

    #[test]
    fn deser_notification() {
        let raw = r#"{"jsonrpc":"2.0","method":"accountNotification","params":{"subscription":7,"result":{"foo":1}}}"#;
        let resp: Response<serde_json::Value> = serde_json::from_str(raw).unwrap();
        match resp {
            Response::Notification { method, params } => {
                assert_eq!(method, "accountNotification");
                assert_eq!(params.subscription, 7);
            }
            _ => panic!("expected notification"),
        }
    }

    #[test]
    fn ser_request() {
        let req = Request::new(1, "accountSubscribe", ("abc", 2));
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"id":1,"jsonrpc":"2.0","method":"accountSubscribe","params":["abc",2]}"#);
    }
}
