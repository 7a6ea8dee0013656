//! Payload encryption for the Pandora JSON API.
//!
//! Every method past the partner handshake carries its JSON body as the
//! hex encoding of a Blowfish-ECB ciphertext. Each 8-byte block is
//! encrypted independently (no chaining, no IV); the plaintext is padded to
//! a block boundary with NUL bytes, matching the padding of the service's
//! own clients. Getting the padding wrong does not produce an obvious
//! error, it silently corrupts every encrypted call, which is why this
//! module is tested against the published Blowfish known-answer vectors.
//!
//! The partner handshake response also contains an encrypted `syncTime`
//! field: 4 bytes of junk followed by the server's epoch seconds in ASCII.
//! [`decrypt_sync_time`] handles that quirk.
//!
//! No keys ship with this crate; the partner credentials file provides
//! them. These functions are pure and hold no state.

use std::fmt::Write;

use blowfish::Blowfish;
use ecb::cipher::{block_padding::ZeroPadding, BlockDecryptMut, BlockEncryptMut, KeyInit};

use crate::error::{Error, Result};

/// Blowfish block size in bytes.
pub const BLOCK_SIZE: usize = 8;

type BfEcbEnc = ecb::Encryptor<Blowfish>;
type BfEcbDec = ecb::Decryptor<Blowfish>;

/// Encrypts `plaintext` and returns the lowercase hex wire form.
///
/// # Errors
///
/// Returns [`Error::Encryption`] if the key length is outside Blowfish's
/// 4..=56 byte range. This is a programmer error, not a runtime condition.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<String> {
    let cipher = BfEcbEnc::new_from_slice(key)
        .map_err(|_| Error::Encryption(format!("invalid key length {}", key.len())))?;

    let padded_len = plaintext.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    let mut buf = vec![0u8; padded_len];
    buf[..plaintext.len()].copy_from_slice(plaintext);

    let ciphertext = cipher
        .encrypt_padded_mut::<ZeroPadding>(&mut buf, plaintext.len())
        .map_err(|e| Error::Encryption(e.to_string()))?;

    Ok(encode_hex(ciphertext))
}

/// Decrypts the hex wire form back into plaintext bytes, with trailing
/// padding removed.
///
/// # Errors
///
/// Returns [`Error::Decryption`] if the input is not valid hex, if the
/// decoded length is not a multiple of the block size, or if the key length
/// is invalid.
pub fn decrypt(key: &[u8], ciphertext_hex: &str) -> Result<Vec<u8>> {
    let mut data = decode_hex(ciphertext_hex)?;
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::Decryption(format!(
            "ciphertext length {} is not a multiple of the {BLOCK_SIZE}-byte block size",
            data.len()
        )));
    }

    let cipher = BfEcbDec::new_from_slice(key)
        .map_err(|_| Error::Decryption(format!("invalid key length {}", key.len())))?;

    let plaintext = cipher
        .decrypt_padded_mut::<ZeroPadding>(&mut data)
        .map_err(|e| Error::Decryption(e.to_string()))?;

    Ok(plaintext.to_vec())
}

/// Decrypts the `syncTime` field of the partner handshake response.
///
/// The decrypted value is 4 junk bytes followed by the server clock as
/// ASCII epoch seconds.
pub fn decrypt_sync_time(key: &[u8], sync_time_hex: &str) -> Result<u64> {
    let plaintext = decrypt(key, sync_time_hex)?;
    let digits = plaintext
        .get(4..)
        .ok_or_else(|| Error::Decryption("syncTime shorter than 4 bytes".to_string()))?;

    let digits: String = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|b| char::from(*b))
        .collect();

    digits
        .parse::<u64>()
        .map_err(|e| Error::Decryption(format!("syncTime is not a timestamp: {e}")))
}

fn encode_hex(data: &[u8]) -> String {
    let mut hex = String::with_capacity(data.len() * 2);
    for byte in data {
        write!(hex, "{byte:02x}").expect("writing to a String cannot fail");
    }
    hex
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(Error::Decryption(format!(
            "hex length {} is odd",
            hex.len()
        )));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| Error::Decryption(format!("invalid hex at offset {i}")))
        })
        .collect()
}
