//! A single APE tag item: a key, a type/readonly flag, and its value.

use crate::ape::constants::{ItemType, FORBIDDEN_KEYS, MAX_KEY_LEN, MIN_KEY_LEN};
use crate::error::Error;

/// The value half of an item: either an ordered list of text strings, or a
/// single opaque blob. `binary`/`reserved` items at rest always hold exactly
/// one blob; multiple values handed to a binary item are concatenated with
/// no separator on build (see `ApeItem::new_binary`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApeValue {
    Text(Vec<String>),
    Binary(Vec<u8>),
}

/// One key/value entry inside an APEv2 tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApeItem {
    pub key: String,
    pub item_type: ItemType,
    pub readonly: bool,
    pub value: ApeValue,
}

impl ApeItem {
    /// Builds a text item, validating the key eagerly.
    pub fn new_text(key: &str, values: Vec<String>) -> Result<Self, Error> {
        validate_key(key)?;
        Ok(Self {
            key: key.to_string(),
            item_type: ItemType::Utf8,
            readonly: false,
            value: ApeValue::Text(values),
        })
    }

    /// Builds a binary item, concatenating any multiple values with no separator.
    pub fn new_binary(key: &str, values: Vec<Vec<u8>>) -> Result<Self, Error> {
        validate_key(key)?;
        let blob = values.concat();
        Ok(Self {
            key: key.to_string(),
            item_type: ItemType::Binary,
            readonly: false,
            value: ApeValue::Binary(blob),
        })
    }

    pub fn lower_key(&self) -> String {
        self.key.to_ascii_lowercase()
    }

    /// Convenience accessor for the common case of a single-valued text item.
    pub fn as_single_text(&self) -> Option<&str> {
        match &self.value {
            ApeValue::Text(values) => values.first().map(String::as_str),
            ApeValue::Binary(_) => None,
        }
    }

    /// The item flags byte: `readonly | (type << 1)`, other bits zero.
    pub fn flags_byte(&self) -> u8 {
        (self.readonly as u8) | (self.item_type.to_bits() << 1)
    }

    /// The raw value bytes as they'd appear on disk.
    pub fn value_bytes(&self) -> Vec<u8> {
        match &self.value {
            ApeValue::Text(values) => values.join("\0").into_bytes(),
            ApeValue::Binary(bytes) => bytes.clone(),
        }
    }

    /// Total encoded length of this item: size(4) + flags(4) + key + NUL + value.
    pub fn encoded_len(&self) -> usize {
        8 + self.key.len() + 1 + self.value_bytes().len()
    }
}

/// Validates a key per §3/§6: length 2-255, every byte in 0x20-0x7E,
/// case-insensitive name not one of the forbidden set.
pub fn validate_key(key: &str) -> Result<(), Error> {
    if key.len() < MIN_KEY_LEN || key.len() > MAX_KEY_LEN {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            reason: format!("length {} outside {MIN_KEY_LEN}..={MAX_KEY_LEN}", key.len()),
        });
    }
    if let Some(bad) = key.bytes().find(|&b| !(0x20..=0x7E).contains(&b)) {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            reason: format!("byte 0x{bad:02x} outside the 0x20-0x7E key alphabet"),
        });
    }
    if FORBIDDEN_KEYS.contains(key.to_ascii_lowercase().as_str()) {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            reason: "key collides with a reserved name".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_forbidden_key_case_insensitively() {
        assert!(validate_key("TAG").is_err());
        assert!(validate_key("Id").is_err());
    }

    #[test]
    fn rejects_key_too_short() {
        assert!(validate_key("a").is_err());
    }

    #[test]
    fn rejects_non_ascii_printable_byte() {
        assert!(validate_key("ke\x01y").is_err());
    }

    #[test]
    fn accepts_ordinary_key() {
        assert!(validate_key("Title").is_ok());
    }

    #[test]
    fn binary_item_concatenates_without_separator() {
        let item = ApeItem::new_binary("Cover", vec![b"ab".to_vec(), b"cd".to_vec()]).unwrap();
        assert_eq!(item.value_bytes(), b"abcd");
    }

    #[test]
    fn text_item_joins_with_nul() {
        let item = ApeItem::new_text("Album", vec!["A".into(), "B".into()]).unwrap();
        assert_eq!(item.value_bytes(), b"A\0B");
    }
}
