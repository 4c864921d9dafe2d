// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Binary-to-text bridge for the weight buffer.
//!
//! The weights file is defined as "each byte becomes the Latin-1 character
//! with the same code point, then the string is base64-encoded". Latin-1
//! maps bytes `0x00..=0xFF` one-to-one onto code points, so that is exactly
//! standard base64 (RFC 4648 alphabet, `=` padding) over the raw bytes,
//! which is what [`encode`] and [`decode`] implement.
//!
//! [`decode`] accepts what a browser `atob` accepts: ASCII whitespace is
//! skipped and trailing padding may be omitted.

use crate::CodecError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const PAD: u8 = b'=';

/// Encodes a byte buffer as padded standard base64.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(data.len()));

    for chunk in data.chunks(3) {
        let mut buf = [0u8; 3];
        buf[..chunk.len()].copy_from_slice(chunk);
        let n = (u32::from(buf[0]) << 16) | (u32::from(buf[1]) << 8) | u32::from(buf[2]);

        out.push(ALPHABET[(n >> 18) as usize & 0x3F] as char);
        out.push(ALPHABET[(n >> 12) as usize & 0x3F] as char);
        if chunk.len() > 1 {
            out.push(ALPHABET[(n >> 6) as usize & 0x3F] as char);
        } else {
            out.push(PAD as char);
        }
        if chunk.len() > 2 {
            out.push(ALPHABET[n as usize & 0x3F] as char);
        } else {
            out.push(PAD as char);
        }
    }

    out
}

/// Length of the padded encoding of `n` bytes.
pub fn encoded_len(n: usize) -> usize {
    n.div_ceil(3) * 4
}

/// Decodes base64 text back into the original bytes.
///
/// Errors carry the byte offset (into `text`) of the offending symbol.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let mut symbols: Vec<(usize, u8)> = text
        .bytes()
        .enumerate()
        .filter(|&(_, b)| !is_ascii_whitespace(b))
        .collect();

    // Up to two trailing pad characters are dropped, only from a full quad.
    if symbols.len() % 4 == 0 {
        for _ in 0..2 {
            if matches!(symbols.last(), Some(&(_, PAD))) {
                symbols.pop();
            }
        }
    }

    if symbols.len() % 4 == 1 {
        let offset = symbols.last().map_or(0, |&(i, _)| i);
        return Err(CodecError::InvalidEncoding {
            offset,
            detail: "truncated input (one dangling symbol)".into(),
        });
    }

    let mut out = Vec::with_capacity(symbols.len() / 4 * 3 + 2);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;

    for &(offset, b) in &symbols {
        let value = sextet(b).ok_or_else(|| CodecError::InvalidEncoding {
            offset,
            detail: format!("unexpected byte 0x{b:02x}"),
        })?;
        acc = (acc << 6) | u32::from(value);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }

    Ok(out)
}

fn sextet(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

fn is_ascii_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}
