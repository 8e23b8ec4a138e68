//! Operation bodies.
//!
//! Every body starts with `opcode(32) · query_id(64)`. The payload that
//! follows depends on the opcode:
//!
//! | Operation | Payload |
//! |---|---|
//! | ChangeOwner | new_owner(address) |
//! | GetRoyaltyParams | |
//! | EditContent | children: [content] [royalty] |
//! | Mine | expire(32) · mint_to(address) · data1(256) · seed(128), child: [data2(256)] |
//! | RescaleComplexity | expire(32) |
//! | RoyaltyParamsResponse | factor(16) · base(16) · address |
//!
//! A full Mine body needs 1033 bits, past the 1023-bit node limit, so the
//! secondary work value rides in the body's only child.

use hashmint_tree::{BitTree, TreeBuilder, TreeReader};
use hashmint_types::Address;

use crate::content::ContentSet;
use crate::error::{CodecError, CodecResult};
use crate::royalty::RoyaltyParams;

/// Operation selectors.
pub mod op {
    pub const CHANGE_OWNER: u32 = 3;
    pub const EDIT_CONTENT: u32 = 4;
    pub const GET_ROYALTY_PARAMS: u32 = 0x693d_3950;
    pub const ROYALTY_PARAMS_RESPONSE: u32 = 0xa8cb_00ad;
    pub const MINE: u32 = 0x4d69_6e65;
    pub const RESCALE_COMPLEXITY: u32 = 0x5253_434c;
}

/// A proof-of-work mint request.
///
/// Optional fields are resolved once here: `query_id` defaults to zero and
/// `data2` defaults to `data1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MineRequest {
    pub query_id: u64,
    /// Last Unix time at which the request is valid.
    pub expire: u32,
    /// Owner of the minted item.
    pub mint_to: Address,
    /// Primary work value; miners vary it to search for a low hash.
    pub data1: [u8; 32],
    /// Must equal the collection's current seed.
    pub seed: u128,
    /// Secondary work value.
    pub data2: [u8; 32],
}

impl MineRequest {
    pub fn new(expire: u32, mint_to: Address, data1: [u8; 32], seed: u128) -> Self {
        Self {
            query_id: 0,
            expire,
            mint_to,
            data1,
            seed,
            data2: data1,
        }
    }

    pub fn with_query_id(mut self, query_id: u64) -> Self {
        self.query_id = query_id;
        self
    }

    pub fn with_secondary(mut self, data2: [u8; 32]) -> Self {
        self.data2 = data2;
        self
    }
}

/// Every operation a collection understands, plus the one reply it sends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionMessage {
    ChangeOwner {
        query_id: u64,
        new_owner: Address,
    },
    GetRoyaltyParams {
        query_id: u64,
    },
    EditContent {
        query_id: u64,
        content: ContentSet,
        royalty: RoyaltyParams,
    },
    Mine(MineRequest),
    RescaleComplexity {
        query_id: u64,
        expire: u32,
    },
    /// Outbound only: answer to [`CollectionMessage::GetRoyaltyParams`].
    RoyaltyParamsResponse {
        query_id: u64,
        royalty: RoyaltyParams,
    },
}

impl CollectionMessage {
    pub fn opcode(&self) -> u32 {
        match self {
            Self::ChangeOwner { .. } => op::CHANGE_OWNER,
            Self::GetRoyaltyParams { .. } => op::GET_ROYALTY_PARAMS,
            Self::EditContent { .. } => op::EDIT_CONTENT,
            Self::Mine(_) => op::MINE,
            Self::RescaleComplexity { .. } => op::RESCALE_COMPLEXITY,
            Self::RoyaltyParamsResponse { .. } => op::ROYALTY_PARAMS_RESPONSE,
        }
    }

    pub fn query_id(&self) -> u64 {
        match self {
            Self::ChangeOwner { query_id, .. }
            | Self::GetRoyaltyParams { query_id }
            | Self::EditContent { query_id, .. }
            | Self::RescaleComplexity { query_id, .. }
            | Self::RoyaltyParamsResponse { query_id, .. } => *query_id,
            Self::Mine(request) => request.query_id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ChangeOwner { .. } => "ChangeOwner",
            Self::GetRoyaltyParams { .. } => "GetRoyaltyParams",
            Self::EditContent { .. } => "EditContent",
            Self::Mine(_) => "Mine",
            Self::RescaleComplexity { .. } => "RescaleComplexity",
            Self::RoyaltyParamsResponse { .. } => "RoyaltyParamsResponse",
        }
    }

    /// Encode into a sealed body.
    pub fn encode(&self) -> CodecResult<BitTree> {
        let mut builder = TreeBuilder::new();
        builder
            .append_u32(self.opcode())?
            .append_u64(self.query_id())?;
        match self {
            Self::ChangeOwner { new_owner, .. } => {
                builder.append_address(new_owner)?;
            }
            Self::GetRoyaltyParams { .. } => {}
            Self::EditContent {
                content, royalty, ..
            } => {
                builder
                    .append_child(content.to_tree()?)?
                    .append_child(royalty.to_tree()?)?;
            }
            Self::Mine(request) => {
                let mut secondary = TreeBuilder::new();
                secondary.append_hash256(&request.data2)?;
                builder
                    .append_u32(request.expire)?
                    .append_address(&request.mint_to)?
                    .append_hash256(&request.data1)?
                    .append_u128(request.seed)?
                    .append_child(secondary.seal())?;
            }
            Self::RescaleComplexity { expire, .. } => {
                builder.append_u32(*expire)?;
            }
            Self::RoyaltyParamsResponse { royalty, .. } => {
                royalty.store(&mut builder)?;
            }
        }
        Ok(builder.seal())
    }

    /// Decode a body. Unknown opcodes and trailing data are rejected.
    pub fn decode(body: &BitTree) -> CodecResult<Self> {
        let mut reader = body.reader();
        let opcode = reader.read_u32()?;
        let query_id = reader.read_u64()?;
        let message = match opcode {
            op::CHANGE_OWNER => Self::ChangeOwner {
                query_id,
                new_owner: reader.read_address()?,
            },
            op::GET_ROYALTY_PARAMS => Self::GetRoyaltyParams { query_id },
            op::EDIT_CONTENT => Self::EditContent {
                query_id,
                content: ContentSet::from_tree(reader.read_child_ref()?)?,
                royalty: RoyaltyParams::from_tree(reader.read_child_ref()?)?,
            },
            op::MINE => Self::Mine(decode_mine(&mut reader, query_id)?),
            op::RESCALE_COMPLEXITY => Self::RescaleComplexity {
                query_id,
                expire: reader.read_u32()?,
            },
            op::ROYALTY_PARAMS_RESPONSE => Self::RoyaltyParamsResponse {
                query_id,
                royalty: RoyaltyParams::load(&mut reader)?,
            },
            other => return Err(CodecError::UnknownOperation(other)),
        };
        reader.ensure_exhausted()?;
        tracing::debug!(
            op = message.type_name(),
            query_id,
            "decoded message body"
        );
        Ok(message)
    }
}

fn decode_mine(reader: &mut TreeReader<'_>, query_id: u64) -> CodecResult<MineRequest> {
    let expire = reader.read_u32()?;
    let mint_to = reader.read_address()?;
    let data1 = reader.read_hash256()?;
    let seed = reader.read_u128()?;
    let mut secondary = reader.read_child()?;
    let data2 = secondary.read_hash256()?;
    secondary.ensure_exhausted()?;
    Ok(MineRequest {
        query_id,
        expire,
        mint_to,
        data1,
        seed,
        data2,
    })
}
