//! Account address type with the `aleo1` bech32m encoding.
//!
//! Address format: `aleo` (human-readable part) + `1` + bech32m(32 key bytes).
//!
//! The 32 key bytes encode to 52 data characters, followed by a 6-character
//! bech32m checksum. Total address length: 4 + 1 + 52 + 6 = 63 characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Bech32 data alphabet.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const CHARSET_REV: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[CHARSET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Checksum constant distinguishing bech32m from the original bech32.
const BECH32M_CONST: u32 = 0x2bc8_30a3;

const HRP: &str = "aleo";
const CHECKSUM_CHARS: usize = 6;
/// 256 bits → ceil(256 / 5) = 52 characters.
const DATA_CHARS: usize = 52;

fn polymod(values: impl Iterator<Item = u8>) -> u32 {
    const GEN: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];
    let mut chk: u32 = 1;
    for v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ v as u32;
        for (i, g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand() -> impl Iterator<Item = u8> {
    HRP.bytes()
        .map(|b| b >> 5)
        .chain(std::iter::once(0))
        .chain(HRP.bytes().map(|b| b & 31))
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_CHARS] {
    let values = hrp_expand()
        .chain(data.iter().copied())
        .chain([0u8; CHECKSUM_CHARS]);
    let pm = polymod(values) ^ BECH32M_CONST;
    let mut out = [0u8; CHECKSUM_CHARS];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ((pm >> (5 * (5 - i))) & 31) as u8;
    }
    out
}

/// Regroup 8-bit bytes into 5-bit groups, zero-padding the tail.
fn to_base32(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in bytes {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((buffer >> bits) & 31) as u8);
        }
    }
    if bits > 0 {
        out.push(((buffer << (5 - bits)) & 31) as u8);
    }
    out
}

/// Regroup 5-bit groups into 32 bytes. Rejects non-zero padding.
fn from_base32(groups: &[u8]) -> Option<[u8; 32]> {
    let mut out = [0u8; 32];
    let mut pos = 0;
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for &g in groups {
        buffer = (buffer << 5) | g as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            *out.get_mut(pos)? = (buffer >> bits) as u8;
            pos += 1;
        }
    }
    if pos != 32 || bits >= 5 || (buffer & ((1 << bits) - 1)) != 0 {
        return None;
    }
    Some(out)
}

/// A program account address, always `aleo1`-prefixed and checksummed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The human-readable prefix plus separator shared by all addresses.
    pub const PREFIX: &'static str = "aleo1";

    /// Length of a well-formed address string.
    pub const LENGTH: usize = 63;

    /// Parse and validate an address string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match decode(&s) {
            Some(_) => Ok(Self(s)),
            None => Err(TypesError::InvalidAddress(s)),
        }
    }

    /// Encode 32 key bytes as an address.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let data = to_base32(bytes);
        let check = checksum(&data);
        let mut s = String::with_capacity(Self::LENGTH);
        s.push_str(Self::PREFIX);
        s.extend(data.iter().chain(check.iter()).map(|&v| CHARSET[v as usize] as char));
        Self(s)
    }

    /// Decode the 32 key bytes behind this address.
    pub fn to_bytes(&self) -> [u8; 32] {
        // Every constructor validates, so decoding cannot fail here.
        decode(&self.0).unwrap_or([0u8; 32])
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn decode(s: &str) -> Option<[u8; 32]> {
    if s.len() != Address::LENGTH || !s.starts_with(Address::PREFIX) {
        return None;
    }
    let mut groups = Vec::with_capacity(DATA_CHARS + CHECKSUM_CHARS);
    for c in s[Address::PREFIX.len()..].bytes() {
        let v = *CHARSET_REV.get(c as usize)?;
        if v == 0xFF {
            return None;
        }
        groups.push(v);
    }
    if polymod(hrp_expand().chain(groups.iter().copied())) != BECH32M_CONST {
        return None;
    }
    from_base32(&groups[..DATA_CHARS])
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
