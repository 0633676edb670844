//! The APEv2 container: parsing a complete tag region into items, and
//! building items back into the canonical on-disk byte string.

use std::collections::HashMap;

use log::{trace, warn};

use crate::ape::constants::{
    self, ItemType, FOOTER_FLAG_BYTE, FOOTER_SIZE, HEADER_FLAG_BYTE, HEADER_SIZE, MAX_TAG_SIZE,
    PREAMBLE,
};
use crate::ape::item::{validate_key, ApeItem, ApeValue};
use crate::error::{Error, Result};
use crate::util::{find_nul, read_u32_le, write_u32_le};

/// An ordered collection of `ApeItem`s, looked up by lowercased key but
/// returned to callers with their original-case key intact.
#[derive(Debug, Clone, Default)]
pub struct ApeTag {
    items: Vec<ApeItem>,
    index: HashMap<String, usize>,
}

impl ApeTag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in insertion order, original-case keys.
    pub fn items(&self) -> &[ApeItem] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&ApeItem> {
        self.index.get(&key.to_ascii_lowercase()).map(|&i| &self.items[i])
    }

    /// Inserts an item, replacing any existing item with the same lowercased key.
    pub fn insert(&mut self, item: ApeItem) {
        let lower = item.lower_key();
        if let Some(&i) = self.index.get(&lower) {
            self.items[i] = item;
        } else {
            self.index.insert(lower, self.items.len());
            self.items.push(item);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ApeItem> {
        let lower = key.to_ascii_lowercase();
        let i = self.index.remove(&lower)?;
        let item = self.items.remove(i);
        // Every index after the removed slot shifted down by one.
        for idx in self.index.values_mut() {
            if *idx > i {
                *idx -= 1;
            }
        }
        Some(item)
    }

    /// Parses a complete APE region (header, items, footer) into an `ApeTag`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(Error::MissingHeader { offset: 0 });
        }

        let footer_offset = bytes.len() - FOOTER_SIZE;
        let header = &bytes[0..HEADER_SIZE];
        let footer = &bytes[footer_offset..];

        if &header[0..12] != PREAMBLE {
            return Err(Error::MissingHeader { offset: 0 });
        }
        if &footer[0..12] != PREAMBLE {
            return Err(Error::MissingHeader {
                offset: footer_offset as u64,
            });
        }

        let header_byte20 = header[20];
        let header_byte23 = header[23];
        if (header_byte20 != 0x00 && header_byte20 != 0x01) || header_byte23 != HEADER_FLAG_BYTE {
            return Err(Error::MissingHeader { offset: 0 });
        }

        let header_size = read_u32_le(header, 12) as u64;
        let footer_size = read_u32_le(footer, 12) as u64;
        if header_size != footer_size {
            return Err(Error::SizeMismatch {
                declared: header_size,
                region: footer_size,
            });
        }

        let header_count = read_u32_le(header, 16);
        let footer_count = read_u32_le(footer, 16);
        if header_count != footer_count {
            return Err(Error::SizeMismatch {
                declared: header_count as u64,
                region: footer_count as u64,
            });
        }

        let byte20 = footer[20];
        let byte23 = footer[23];
        if (byte20 != 0x00 && byte20 != 0x01) || byte23 != FOOTER_FLAG_BYTE {
            return Err(Error::InvalidFooterFlags { byte20, byte23 });
        }

        let numitems = header_count as usize;
        let max_items = constants::max_item_count(bytes.len());
        if numitems > max_items {
            return Err(Error::TooManyItems {
                actual: numitems,
                limit: max_items,
            });
        }

        let mut tag = ApeTag::new();
        let mut cur = HEADER_SIZE;

        for _ in 0..numitems {
            if cur + 8 > footer_offset {
                return Err(Error::SizeMismatch {
                    declared: (cur + 8) as u64,
                    region: footer_offset as u64,
                });
            }

            let value_size_raw = read_u32_le(bytes, cur);
            if value_size_raw > i32::MAX as u32 {
                return Err(Error::InvalidItemFlags {
                    offset: cur as u64,
                    flags: value_size_raw,
                });
            }
            let value_size = value_size_raw as usize;

            let flags_bytes = &bytes[cur + 4..cur + 8];
            if flags_bytes[0] != 0 || flags_bytes[1] != 0 || flags_bytes[2] != 0 || flags_bytes[3] > 7 {
                return Err(Error::InvalidItemFlags {
                    offset: (cur + 4) as u64,
                    flags: read_u32_le(bytes, cur + 4),
                });
            }
            let flag_byte = flags_bytes[3];
            let item_type = ItemType::from_bits(flag_byte >> 1);
            let readonly = flag_byte & 1 != 0;

            let key_start = cur + 8;
            let nul = find_nul(bytes, key_start).filter(|&n| n <= footer_offset).ok_or(
                Error::SizeMismatch {
                    declared: key_start as u64,
                    region: footer_offset as u64,
                },
            )?;
            let key = std::str::from_utf8(&bytes[key_start..nul])
                .map_err(|source| Error::InvalidUtf8 {
                    key: format!("<bytes at {key_start}>"),
                    source,
                })?
                .to_string();
            validate_key(&key)?;

            let value_start = nul + 1;
            let value_end = value_start + value_size;
            if value_end > footer_offset {
                return Err(Error::SizeMismatch {
                    declared: value_end as u64,
                    region: footer_offset as u64,
                });
            }
            let raw_value = &bytes[value_start..value_end];

            let value = if item_type.is_text() {
                let text = std::str::from_utf8(raw_value).map_err(|source| Error::InvalidUtf8 {
                    key: key.clone(),
                    source,
                })?;
                ApeValue::Text(text.split('\0').map(str::to_string).collect())
            } else {
                ApeValue::Binary(raw_value.to_vec())
            };

            let lower = key.to_ascii_lowercase();
            if tag.index.contains_key(&lower) {
                return Err(Error::DuplicateKey { key });
            }

            tag.insert(ApeItem {
                key,
                item_type,
                readonly,
                value,
            });

            cur = value_end;
        }

        if cur != footer_offset {
            return Err(Error::TrailingBytes {
                count: (footer_offset - cur) as u64,
            });
        }

        trace!("ape: parsed {} item(s)", tag.len());
        Ok(tag)
    }

    /// Serializes this tag's items into the canonical on-disk byte string:
    /// header, items sorted ascending by encoded length, footer.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut encoded: Vec<Vec<u8>> = self.items.iter().map(encode_item).collect::<Result<_>>()?;
        encoded.sort_by_key(|bytes| bytes.len());

        let items_len: usize = encoded.iter().map(Vec::len).sum();
        let size_field = (FOOTER_SIZE + items_len) as u32;
        let total_len = HEADER_SIZE + items_len + FOOTER_SIZE;

        if total_len > MAX_TAG_SIZE {
            warn!("ape: built tag of {total_len} bytes exceeds the {MAX_TAG_SIZE} byte limit");
            return Err(Error::TooLarge {
                actual: total_len,
                limit: MAX_TAG_SIZE,
            });
        }

        let mut out = Vec::with_capacity(total_len);
        out.extend_from_slice(&build_frame(size_field, self.items.len() as u32, HEADER_FLAG_BYTE));
        for item in &encoded {
            out.extend_from_slice(item);
        }
        out.extend_from_slice(&build_frame(size_field, self.items.len() as u32, FOOTER_FLAG_BYTE));

        debug_assert_eq!(out.len(), total_len);
        Ok(out)
    }
}

/// Builds a 32-byte header/footer frame. Byte 20 is always emitted as 0x00
/// for bug-compatibility with the existing writer (see the open question in
/// the design notes); byte 23 distinguishes header (0xA0) from footer (0x80).
fn build_frame(size: u32, item_count: u32, flag_byte: u8) -> [u8; HEADER_SIZE] {
    let mut frame = [0u8; HEADER_SIZE];
    frame[0..8].copy_from_slice(constants::SIGNATURE);
    write_u32_le(&mut frame, 8, constants::VERSION);
    write_u32_le(&mut frame, 12, size);
    write_u32_le(&mut frame, 16, item_count);
    frame[20] = 0x00;
    frame[23] = flag_byte;
    frame
}

fn encode_item(item: &ApeItem) -> Result<Vec<u8>> {
    let value_bytes = item.value_bytes();
    let mut out = Vec::with_capacity(item.encoded_len());
    out.extend_from_slice(&(value_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0, 0, 0, item.flags_byte()]);
    out.extend_from_slice(item.key.as_bytes());
    out.push(0);
    out.extend_from_slice(&value_bytes);
    Ok(out)
}

/// Builds the fixed 64-byte empty tag (header + footer, zero items).
pub fn empty_tag_bytes() -> [u8; HEADER_SIZE + FOOTER_SIZE] {
    let mut out = [0u8; HEADER_SIZE + FOOTER_SIZE];
    out[0..HEADER_SIZE].copy_from_slice(&build_frame(FOOTER_SIZE as u32, 0, HEADER_FLAG_BYTE));
    out[HEADER_SIZE..].copy_from_slice(&build_frame(FOOTER_SIZE as u32, 0, FOOTER_FLAG_BYTE));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tag_is_exactly_64_bytes() {
        let bytes = empty_tag_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(bytes[23], HEADER_FLAG_BYTE);
        assert_eq!(bytes[bytes.len() - 9], FOOTER_FLAG_BYTE);
    }

    #[test]
    fn parse_of_build_round_trips() {
        let mut tag = ApeTag::new();
        tag.insert(ApeItem::new_text("Title", vec!["Love Cheese".into()]).unwrap());
        tag.insert(ApeItem::new_text("Artist", vec!["Test Artist".into()]).unwrap());
        let bytes = tag.build().unwrap();
        let parsed = ApeTag::parse(&bytes).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("title").unwrap().as_single_text(), Some("Love Cheese"));
        assert_eq!(parsed.get("ARTIST").unwrap().key, "Artist");
    }

    #[test]
    fn build_sorts_items_ascending_by_length() {
        let mut tag = ApeTag::new();
        tag.insert(ApeItem::new_text("Album", vec!["A very long album title indeed".into()]).unwrap());
        tag.insert(ApeItem::new_text("Yr", vec!["1".into()]).unwrap());
        let bytes = tag.build().unwrap();
        let first_len = read_u32_le(&bytes, HEADER_SIZE) as usize;
        // The shorter "Yr" item must be emitted first.
        assert!(first_len < 10);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let bytes = {
            let mut tag = ApeTag::new();
            tag.insert(ApeItem::new_text("Title", vec!["one".into()]).unwrap());
            let mut raw = tag.build().unwrap();
            // Duplicate the single item by hand, bumping item_count.
            let item_bytes = raw[HEADER_SIZE..raw.len() - FOOTER_SIZE].to_vec();
            let mut rebuilt = raw[..HEADER_SIZE].to_vec();
            write_u32_le(&mut rebuilt, 16, 2);
            let items_len = item_bytes.len() * 2;
            write_u32_le(&mut rebuilt, 12, (FOOTER_SIZE + items_len) as u32);
            rebuilt.extend_from_slice(&item_bytes);
            rebuilt.extend_from_slice(&item_bytes);
            let mut footer = raw.split_off(raw.len() - FOOTER_SIZE);
            write_u32_le(&mut footer, 12, (FOOTER_SIZE + items_len) as u32);
            write_u32_le(&mut footer, 16, 2);
            rebuilt.extend_from_slice(&footer);
            rebuilt
        };
        let err = ApeTag::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }

    #[test]
    fn mismatched_header_footer_size_is_rejected() {
        let mut tag = ApeTag::new();
        tag.insert(ApeItem::new_text("Title", vec!["one".into()]).unwrap());
        let mut bytes = tag.build().unwrap();
        let footer_offset = bytes.len() - FOOTER_SIZE;
        write_u32_le(&mut bytes, footer_offset + 12, 9999);
        let err = ApeTag::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
    }

    #[test]
    fn corrupted_header_flags_are_rejected() {
        let mut tag = ApeTag::new();
        tag.insert(ApeItem::new_text("Title", vec!["one".into()]).unwrap());
        let mut bytes = tag.build().unwrap();
        bytes[23] = FOOTER_FLAG_BYTE;
        let err = ApeTag::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::MissingHeader { .. }));
    }

    #[test]
    fn invalid_key_is_rejected_before_any_write() {
        let result = ApeItem::new_text("k\x01ey", vec!["v".into()]);
        assert!(matches!(result, Err(Error::InvalidKey { .. })));
    }

    #[test]
    fn remove_reindexes_remaining_items() {
        let mut tag = ApeTag::new();
        tag.insert(ApeItem::new_text("Aa", vec!["1".into()]).unwrap());
        tag.insert(ApeItem::new_text("Bb", vec!["2".into()]).unwrap());
        tag.insert(ApeItem::new_text("Cc", vec!["3".into()]).unwrap());
        tag.remove("aa");
        assert_eq!(tag.get("bb").unwrap().as_single_text(), Some("2"));
        assert_eq!(tag.get("cc").unwrap().as_single_text(), Some("3"));
    }
}
