//! Streaming age encryption with ASCII armor
//!
//! The plaintext file is copied through two nested writers:
//!
//! ```text
//! plaintext -> age StreamWriter -> ArmoredWriter -> output file
//! ```
//!
//! The age stream must be finished before the armor, and the armor before
//! the file is synced. An output file that was not sealed in that order is
//! removed.

use crate::error::{Error, Result};
use age::armor::{ArmoredWriter, Format};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Read buffer size used while streaming plaintext into the encryptor
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Parse an X25519 recipient (`age1...`)
pub fn parse_recipient(public_key: &str) -> Result<age::x25519::Recipient> {
    public_key
        .trim()
        .parse::<age::x25519::Recipient>()
        .map_err(Error::invalid_recipient)
}

/// Encrypt `plaintext_path` to `output_path` for `recipient_public_key`
///
/// Returns the number of plaintext bytes encrypted. The recipient is parsed
/// before any file is opened.
pub fn encrypt_file(
    recipient_public_key: &str,
    plaintext_path: &Path,
    output_path: &Path,
) -> Result<u64> {
    let recipient = parse_recipient(recipient_public_key)?;

    let input = File::open(plaintext_path).map_err(|e| Error::io(plaintext_path, e))?;
    let output = File::create(output_path).map_err(|e| Error::io(output_path, e))?;

    let result = seal(&recipient, BufReader::with_capacity(CHUNK_SIZE, input), output, output_path);
    if result.is_err() {
        // An unsealed envelope must never look like a finished artifact
        let _ = std::fs::remove_file(output_path);
    }
    result
}

fn seal(
    recipient: &age::x25519::Recipient,
    mut input: impl io::Read,
    output: File,
    output_path: &Path,
) -> Result<u64> {
    let armored = ArmoredWriter::wrap_output(BufWriter::new(output), Format::AsciiArmor)
        .map_err(|e| Error::encryption("open armor for", output_path, e))?;

    let encryptor =
        age::Encryptor::with_recipients(std::iter::once(recipient as &dyn age::Recipient))
            .map_err(|e| {
                Error::encryption("create encryptor for", output_path, io::Error::other(e.to_string()))
            })?;
    let mut writer = encryptor
        .wrap_output(armored)
        .map_err(|e| Error::encryption("open encryption stream for", output_path, e))?;

    let copied = io::copy(&mut input, &mut writer)
        .map_err(|e| Error::encryption("encrypt into", output_path, e))?;

    let armored = writer
        .finish()
        .map_err(|e| Error::encryption("finish encryption stream for", output_path, e))?;
    let buffered = armored
        .finish()
        .map_err(|e| Error::encryption("close armor for", output_path, e))?;
    let file = buffered
        .into_inner()
        .map_err(|e| Error::encryption("flush", output_path, e.into_error()))?;
    file.sync_all()
        .map_err(|e| Error::encryption("sync", output_path, e))?;

    Ok(copied)
}
