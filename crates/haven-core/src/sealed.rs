//! Sealed vault payloads.
//!
//! This is the placeholder codec the web client applies before a secret
//! ever reaches the server: `enc_<tag>_<base64>` where `<tag>` is the
//! first four characters of the client-held key. It is an encoding, NOT
//! encryption; the server treats payloads as opaque except in the
//! disclosure path, which recovers the plaintext via the embedded tag
//! exactly the way the client would.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use thiserror::Error;

const PREFIX: &str = "enc";
const TAG_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum SealedError {
    #[error("Key must be at least {TAG_LEN} characters")]
    KeyTooShort,

    #[error("Payload is not a sealed blob")]
    Malformed,

    #[error("Key does not match payload")]
    KeyMismatch,

    #[error("Payload body is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Payload body is not valid UTF-8")]
    NotUtf8,
}

/// Generate a client key: 32 random bytes as lowercase hex.
pub fn generate_key() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Seal a plaintext under `key`.
pub fn seal(plaintext: &str, key: &str) -> Result<String, SealedError> {
    let tag = key_tag(key)?;
    Ok(format!("{PREFIX}_{tag}_{}", BASE64.encode(plaintext)))
}

/// Open a sealed payload, verifying it was sealed under `key`.
pub fn open(payload: &str, key: &str) -> Result<String, SealedError> {
    let tag = key_tag(key)?;
    let (payload_tag, body) = split(payload)?;
    if payload_tag != tag {
        return Err(SealedError::KeyMismatch);
    }
    decode(body)
}

/// Open a sealed payload using the tag embedded in the payload itself.
///
/// The disclosure path has no access to client keys; it reads the tag
/// back out of the blob, the same self-referential shortcut the original
/// client takes. Works only because this codec is a placeholder.
pub fn open_embedded(payload: &str) -> Result<String, SealedError> {
    let (_tag, body) = split(payload)?;
    decode(body)
}

fn key_tag(key: &str) -> Result<&str, SealedError> {
    if key.len() < TAG_LEN {
        return Err(SealedError::KeyTooShort);
    }
    Ok(&key[..TAG_LEN])
}

fn split(payload: &str) -> Result<(&str, &str), SealedError> {
    let mut parts = payload.splitn(3, '_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(PREFIX), Some(tag), Some(body)) if tag.len() == TAG_LEN => Ok((tag, body)),
        _ => Err(SealedError::Malformed),
    }
}

fn decode(body: &str) -> Result<String, SealedError> {
    let bytes = BASE64.decode(body)?;
    String::from_utf8(bytes).map_err(|_| SealedError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = generate_key();
        let sealed = seal(r#"{"password":"hunter2"}"#, &key).unwrap();

        assert!(sealed.starts_with(&format!("enc_{}_", &key[..4])));
        assert_eq!(open(&sealed, &key).unwrap(), r#"{"password":"hunter2"}"#);
    }

    #[test]
    fn test_open_rejects_wrong_key() {
        let sealed = seal("secret", "aaaa1111").unwrap();
        assert!(matches!(
            open(&sealed, "bbbb2222"),
            Err(SealedError::KeyMismatch)
        ));
    }

    #[test]
    fn test_open_embedded_needs_no_key() {
        let key = generate_key();
        let sealed = seal("secret", &key).unwrap();
        assert_eq!(open_embedded(&sealed).unwrap(), "secret");
    }

    #[test]
    fn test_malformed_payloads() {
        for bad in ["", "enc", "enc_abcd", "notenc_abcd_aGk=", "enc_ab_aGk="] {
            assert!(open_embedded(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_bad_base64_body() {
        assert!(matches!(
            open_embedded("enc_abcd_%%%"),
            Err(SealedError::Encoding(_))
        ));
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(matches!(seal("x", "ab"), Err(SealedError::KeyTooShort)));
    }

    #[test]
    fn test_generate_key_shape() {
        let key = generate_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
