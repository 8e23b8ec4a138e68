//! Content strings.
//!
//! Strings are stored "snake" style: a node carries as many whole bytes as
//! fit, and the remainder continues in the node's single child. Off-chain
//! content prefixes the first node with [`OFFCHAIN_TAG`]; plain snake
//! strings (the common URL prefix and per-item suffixes) carry no tag so
//! they can be concatenated.

use hashmint_tree::{BitTree, TreeBuilder, TreeRef, MAX_BITS};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Tag byte for off-chain content: raw UTF-8 bytes follow.
pub const OFFCHAIN_TAG: u8 = 0x01;

const BYTES_PER_NODE: usize = MAX_BITS / 8;

/// Encode `text` as off-chain content: tag byte, then snake bytes.
pub fn encode_offchain(text: &str) -> CodecResult<BitTree> {
    encode_snake_bytes(text.as_bytes(), Some(OFFCHAIN_TAG))
}

/// Decode off-chain content, checking the tag.
pub fn decode_offchain(node: TreeRef<'_>) -> CodecResult<String> {
    let mut reader = node.reader();
    let tag = reader.read_u8()?;
    if tag != OFFCHAIN_TAG {
        return Err(CodecError::UnknownContentTag(tag));
    }
    let bytes = read_snake_bytes(node, 8)?;
    into_utf8(bytes)
}

/// Encode `text` as an untagged snake string.
pub fn encode_snake(text: &str) -> CodecResult<BitTree> {
    encode_snake_bytes(text.as_bytes(), None)
}

/// Decode an untagged snake string.
pub fn decode_snake(node: TreeRef<'_>) -> CodecResult<String> {
    let bytes = read_snake_bytes(node, 0)?;
    into_utf8(bytes)
}

fn encode_snake_bytes(bytes: &[u8], tag: Option<u8>) -> CodecResult<BitTree> {
    let head_len = bytes.len().min(BYTES_PER_NODE - usize::from(tag.is_some()));
    let (head, tail) = bytes.split_at(head_len);

    // Build the continuation chain from the last chunk backwards.
    let mut next: Option<BitTree> = None;
    let chunks: Vec<&[u8]> = tail.chunks(BYTES_PER_NODE).collect();
    for chunk in chunks.into_iter().rev() {
        let mut builder = TreeBuilder::new();
        builder.append_bytes(chunk)?;
        if let Some(child) = next.take() {
            builder.append_child(child)?;
        }
        next = Some(builder.seal());
    }

    let mut builder = TreeBuilder::new();
    if let Some(tag) = tag {
        builder.append_u8(tag)?;
    }
    builder.append_bytes(head)?;
    if let Some(child) = next {
        builder.append_child(child)?;
    }
    Ok(builder.seal())
}

fn read_snake_bytes(node: TreeRef<'_>, skip_bits: usize) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut reader = node.reader();
    if skip_bits > 0 {
        reader.read_uint(skip_bits)?;
    }
    loop {
        let remaining = reader.remaining_bits();
        if remaining % 8 != 0 {
            return Err(CodecError::InvalidContent(format!(
                "{remaining} bits is not a whole number of bytes"
            )));
        }
        out.extend(reader.read_bytes(remaining / 8)?);
        match reader.remaining_children() {
            0 => return Ok(out),
            1 => reader = reader.read_child()?,
            n => {
                return Err(CodecError::InvalidContent(format!(
                    "snake node has {n} children"
                )))
            }
        }
    }
}

fn into_utf8(bytes: Vec<u8>) -> CodecResult<String> {
    String::from_utf8(bytes).map_err(|e| CodecError::InvalidContent(e.to_string()))
}

/// The collection-level content pair.
///
/// Encoded as a node with no bits and two children: the off-chain
/// collection content, then the untagged common content prefix shared by
/// every item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSet {
    /// Metadata for the collection itself.
    pub collection_content: String,
    /// Prefix joined onto each item's own content.
    pub common_content: String,
}

impl ContentSet {
    pub fn new(collection_content: impl Into<String>, common_content: impl Into<String>) -> Self {
        Self {
            collection_content: collection_content.into(),
            common_content: common_content.into(),
        }
    }

    pub fn to_tree(&self) -> CodecResult<BitTree> {
        let mut builder = TreeBuilder::new();
        builder.append_child(encode_offchain(&self.collection_content)?)?;
        builder.append_child(encode_snake(&self.common_content)?)?;
        Ok(builder.seal())
    }

    pub fn from_tree(node: TreeRef<'_>) -> CodecResult<Self> {
        let mut reader = node.reader();
        let collection_content = decode_offchain(reader.read_child_ref()?)?;
        let common_content = decode_snake(reader.read_child_ref()?)?;
        reader.ensure_exhausted()?;
        Ok(Self {
            collection_content,
            common_content,
        })
    }

    /// Full content of one item: the common prefix followed by the item's
    /// own suffix.
    pub fn item_content(&self, item_suffix: &str) -> String {
        format!("{}{}", self.common_content, item_suffix)
    }
}
