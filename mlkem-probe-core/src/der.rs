//! Minimal DER reader.
//!
//! Decodes only the universal types an ML-KEM key container is built from:
//! SEQUENCE, INTEGER, OBJECT IDENTIFIER, OCTET STRING and BIT STRING.
//! Lengths must use the minimal definite form.

use crate::{Error, Result};

/// Universal tag numbers (constructed bit included for SEQUENCE).
pub(crate) mod tag {
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
}

fn malformed(context: &'static str) -> Error {
    Error::MalformedDer { context }
}

/// Cursor over DER-encoded bytes.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// True when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fail with [`Error::TrailingData`] unless every byte has been consumed.
    pub fn finish(&self, context: &'static str) -> Result<()> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(Error::TrailingData { context })
        }
    }

    fn read_length(&mut self) -> Result<usize> {
        let (&first, rest) = self.data.split_first().ok_or(malformed("missing length"))?;
        self.data = rest;

        if first < 0x80 {
            return Ok(first as usize);
        }

        let count = (first & 0x7F) as usize;
        if count == 0 {
            return Err(malformed("indefinite length"));
        }
        if count > 4 || count > self.data.len() {
            return Err(malformed("length field too long"));
        }

        let (len_bytes, rest) = self.data.split_at(count);
        if len_bytes[0] == 0 {
            return Err(malformed("non-minimal length"));
        }
        let len = len_bytes
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        if len < 0x80 {
            return Err(malformed("non-minimal length"));
        }

        self.data = rest;
        Ok(len)
    }

    /// Read one tag-length-value triple with the given tag and return its
    /// contents.
    fn read_tlv(&mut self, expected: u8, context: &'static str) -> Result<&'a [u8]> {
        let (&found, rest) = self.data.split_first().ok_or(malformed(context))?;
        if found != expected {
            return Err(malformed(context));
        }
        self.data = rest;

        let len = self.read_length()?;
        if len > self.data.len() {
            return Err(malformed(context));
        }
        let (content, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(content)
    }

    /// Read a SEQUENCE and return a reader over its contents.
    pub fn read_sequence(&mut self) -> Result<Reader<'a>> {
        self.read_tlv(tag::SEQUENCE, "expected SEQUENCE")
            .map(Reader::new)
    }

    /// Read a non-negative INTEGER that fits in a `u64`.
    pub fn read_small_uint(&mut self) -> Result<u64> {
        let content = self.read_tlv(tag::INTEGER, "expected INTEGER")?;
        let (&first, _) = content.split_first().ok_or(malformed("empty INTEGER"))?;
        if first & 0x80 != 0 {
            return Err(malformed("negative INTEGER"));
        }
        if content.len() > 1 && first == 0 && content[1] & 0x80 == 0 {
            return Err(malformed("non-minimal INTEGER"));
        }

        let digits = if first == 0 { &content[1..] } else { content };
        if digits.len() > 8 {
            return Err(malformed("INTEGER too large"));
        }
        Ok(digits.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Read an OBJECT IDENTIFIER and return its arcs.
    pub fn read_oid(&mut self) -> Result<Vec<u64>> {
        let content = self.read_tlv(tag::OBJECT_IDENTIFIER, "expected OBJECT IDENTIFIER")?;
        if content.is_empty() {
            return Err(malformed("empty OBJECT IDENTIFIER"));
        }

        let mut arcs = Vec::with_capacity(content.len() + 1);
        let mut value: u64 = 0;
        let mut at_start = true;

        for &byte in content {
            if at_start && byte == 0x80 {
                return Err(malformed("non-minimal OID subidentifier"));
            }
            if value > (u64::MAX >> 7) {
                return Err(malformed("OID subidentifier overflow"));
            }
            value = (value << 7) | (byte & 0x7F) as u64;
            at_start = false;

            if byte & 0x80 == 0 {
                if arcs.is_empty() {
                    // First subidentifier packs the first two arcs as 40 * a + b.
                    let first = (value / 40).min(2);
                    arcs.push(first);
                    arcs.push(value - 40 * first);
                } else {
                    arcs.push(value);
                }
                value = 0;
                at_start = true;
            }
        }

        if !at_start {
            return Err(malformed("truncated OID subidentifier"));
        }
        Ok(arcs)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<&'a [u8]> {
        self.read_tlv(tag::OCTET_STRING, "expected OCTET STRING")
    }

    /// Read a BIT STRING that must have zero unused bits and return its
    /// payload bytes.
    pub fn read_bit_string(&mut self) -> Result<&'a [u8]> {
        let content = self.read_tlv(tag::BIT_STRING, "expected BIT STRING")?;
        match content.split_first() {
            Some((0, payload)) => Ok(payload),
            Some(_) => Err(malformed("BIT STRING with unused bits")),
            None => Err(malformed("empty BIT STRING")),
        }
    }
}

/// Dotted-decimal rendering of OID arcs.
pub fn format_oid(arcs: &[u64]) -> String {
    arcs.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
