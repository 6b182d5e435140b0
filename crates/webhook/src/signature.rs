use {
    hmac::{Hmac, Mac},
    sha2::Sha256,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

/// Verify an `X-Hub-Signature-256` style header against the raw body.
///
/// Computes HMAC-SHA256 over `body` keyed by `secret`, renders it as
/// `sha256=<hex>`, and compares with the header in constant time. An absent
/// or malformed header fails verification; it never panics.
pub fn verify_signature(body: &[u8], secret: &str, signature_header: Option<&str>) -> bool {
    let Some(header) = signature_header else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

    // ct_eq yields false for mismatched lengths without early exit on
    // matching prefixes.
    expected.as_bytes().ct_eq(header.as_bytes()).into()
}

/// Render the expected signature header for `body`. Used by tests and by
/// operators debugging a delivery mismatch.
pub fn sign(body: &[u8], secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
