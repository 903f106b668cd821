//! BER (Basic Encoding Rules) encoder and decoder for ASN.1
//!
//! This module provides the BER functionality needed by LDAP controls and
//! extended operations.
//!
//! # ASN.1 BER Encoding Overview
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30), or 11111 indicates extended tag
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127
//! - **Long form**: first byte `0x80 | n`, followed by `n` big-endian length bytes
//!
//! Indefinite length is rejected; LDAP only ever uses definite lengths.
//!
//! # Two Decoding Styles
//!
//! - [`BerDecoder`] walks a borrowed buffer field by field. Good for
//!   fixed-shape SEQUENCEs where optional members are recognised by
//!   peeking at the next tag.
//! - [`BerElement`] is an owned tree node. Good for recursive values
//!   (join rules, chained client requests) where an element is handed to
//!   the same decoder again.

pub mod decoder;
pub mod element;
pub mod encoder;
pub mod types;

pub use decoder::BerDecoder;
pub use element::BerElement;
pub use encoder::BerEncoder;
pub use types::{BerLength, BerTag, BerTagClass};
