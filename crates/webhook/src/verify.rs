use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies webhook payloads against their `X-TradingView-Signature` header.
///
/// The signature is the hex HMAC-SHA256 of the canonical JSON encoding of
/// the payload, keyed with the shared secret. Comparison happens on the
/// decoded digest bytes via `Mac::verify_slice`, which is constant-time, so
/// a mismatch position leaks nothing about the secret.
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Check `signature` against the canonical encoding of `payload`.
    /// Returns false on any mismatch, including undecodable hex. Never errors.
    pub fn validate(&self, payload: &Value, signature: &str) -> bool {
        let provided = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        self.mac_over(payload).verify_slice(&provided).is_ok()
    }

    /// Produce the hex signature for `payload`. The signer side of
    /// `validate`; alert senders and tests use this.
    pub fn sign(&self, payload: &Value) -> String {
        hex::encode(self.mac_over(payload).finalize().into_bytes())
    }

    fn mac_over(&self, payload: &Value) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(&canonical_json(payload));
        mac
    }
}

/// Canonical JSON encoding: compact separators, object keys sorted bytewise
/// at every nesting level. Signer and verifier must agree on these bytes
/// exactly, so the encoding is written out explicitly here rather than
/// relying on serializer map-ordering behavior.
pub fn canonical_json(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key).expect("writing to a Vec cannot fail");
                out.push(b':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        scalar => serde_json::to_writer(&mut *out, scalar).expect("writing to a Vec cannot fail"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_sorts_keys_at_every_level() {
        let payload = json!({
            "symbol": "BTCUSDT",
            "action": "BUY",
            "parameters": {"timeframe": "1h", "position_size": 1.0},
        });
        let encoded = String::from_utf8(canonical_json(&payload)).unwrap();
        assert_eq!(
            encoded,
            r#"{"action":"BUY","parameters":{"position_size":1.0,"timeframe":"1h"},"symbol":"BTCUSDT"}"#
        );
    }

    #[test]
    fn sign_then_validate_roundtrips() {
        let verifier = SignatureVerifier::new("test-secret-key");
        let payload = json!({"symbol": "BTCUSDT", "action": "BUY", "price": 50000.0});
        let signature = verifier.sign(&payload);
        assert!(verifier.validate(&payload, &signature));
    }

    #[test]
    fn validate_is_key_order_independent() {
        let verifier = SignatureVerifier::new("test-secret-key");
        let a = json!({"action": "BUY", "price": 50000.0, "symbol": "BTCUSDT"});
        let b = json!({"symbol": "BTCUSDT", "price": 50000.0, "action": "BUY"});
        assert_eq!(verifier.sign(&a), verifier.sign(&b));
        assert!(verifier.validate(&b, &verifier.sign(&a)));
    }

    #[test]
    fn known_vector() {
        // HMAC-SHA256("test-secret-key",
        //   {"action":"BUY","price":50000.0,"symbol":"BTCUSDT"})
        let verifier = SignatureVerifier::new("test-secret-key");
        let payload = json!({"action": "BUY", "price": 50000.0, "symbol": "BTCUSDT"});
        assert_eq!(
            verifier.sign(&payload),
            "445f79a1e73abbfc7396aae2708c632bfce65b35e43627edd248fa108252ae3f"
        );
    }

    #[test]
    fn any_single_byte_mutation_fails() {
        let verifier = SignatureVerifier::new("test-secret-key");
        let payload = json!({"symbol": "BTCUSDT", "action": "SELL", "price": 42.5});
        let signature = verifier.sign(&payload);

        for i in 0..signature.len() {
            let mut mutated: Vec<char> = signature.chars().collect();
            mutated[i] = if mutated[i] == '0' { '1' } else { '0' };
            let mutated: String = mutated.into_iter().collect();
            if mutated != signature {
                assert!(!verifier.validate(&payload, &mutated), "byte {i} accepted");
            }
        }
    }

    #[test]
    fn garbage_signatures_are_rejected_without_panic() {
        let verifier = SignatureVerifier::new("test-secret-key");
        let payload = json!({"symbol": "BTCUSDT"});
        assert!(!verifier.validate(&payload, "invalid-signature"));
        assert!(!verifier.validate(&payload, ""));
        assert!(!verifier.validate(&payload, "deadbeef")); // wrong length
    }

    #[test]
    fn wrong_secret_fails() {
        let payload = json!({"symbol": "BTCUSDT", "action": "BUY", "price": 1.0});
        let signature = SignatureVerifier::new("secret-a").sign(&payload);
        assert!(!SignatureVerifier::new("secret-b").validate(&payload, &signature));
    }
}
