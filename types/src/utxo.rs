//! Unspent outputs and their packed ledger positions.

use crate::currency::Currency;
use serde::{Deserialize, Serialize};
use std::fmt;
use web3::types::{Address, U256};

/// Multiplier isolating the block index inside a packed position.
pub const BLOCK_OFFSET: u64 = 1_000_000_000;
/// Multiplier isolating the transaction index inside a packed position.
pub const TX_OFFSET: u64 = 10_000;

/// The position of an output on the child chain: block index, transaction
/// index within the block, and output index within the transaction.
///
/// Positions are the spend identity of an output. Two `Utxo` values refer to
/// the same spendable output if and only if their positions are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoPos {
    pub blknum: u64,
    pub txindex: u32,
    pub oindex: u32,
}

impl UtxoPos {
    pub fn new(blknum: u64, txindex: u32, oindex: u32) -> Self {
        Self {
            blknum,
            txindex,
            oindex,
        }
    }

    /// Pack into the single integer used on the wire and by the root-chain
    /// exit entry point: `blknum * 1_000_000_000 + txindex * 10_000 + oindex`.
    pub fn encode(&self) -> U256 {
        U256::from(self.blknum) * U256::from(BLOCK_OFFSET)
            + U256::from(self.txindex) * U256::from(TX_OFFSET)
            + U256::from(self.oindex)
    }

    /// Unpack from the wire encoding.
    pub fn decode(packed: U256) -> Self {
        let block_offset = U256::from(BLOCK_OFFSET);
        let tx_offset = U256::from(TX_OFFSET);
        let blknum = (packed / block_offset).as_u64();
        let rest = packed % block_offset;
        Self {
            blknum,
            txindex: (rest / tx_offset).as_u32(),
            oindex: (rest % tx_offset).as_u32(),
        }
    }
}

// The packed form is how operators, explorers, and the exit entry point all
// refer to a position, so Display uses it too.
impl fmt::Display for UtxoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// An unspent output observed on the child chain.
///
/// Immutable once observed. Any extra fields the child chain returned are kept
/// verbatim in `extra` so the object can be echoed back (e.g. when requesting
/// exit data).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Utxo {
    pub owner: Address,
    pub currency: Currency,
    pub amount: U256,
    pub blknum: u64,
    pub txindex: u32,
    pub oindex: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Utxo {
    /// The spend identity of this output.
    pub fn position(&self) -> UtxoPos {
        UtxoPos::new(self.blknum, self.txindex, self.oindex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_packing_matches_offsets() {
        let pos = UtxoPos::new(5, 3, 1);
        assert_eq!(pos.encode(), U256::from(5_000_030_001u64));
    }

    #[test]
    fn position_roundtrip() {
        let pos = UtxoPos::new(123_456, 42, 3);
        assert_eq!(UtxoPos::decode(pos.encode()), pos);
    }

    #[test]
    fn utxo_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "owner": "0x00000000000000000000000000000000000000aa",
            "currency": "0x0000000000000000000000000000000000000000",
            "amount": "0x64",
            "blknum": 7000,
            "txindex": 0,
            "oindex": 1,
            "creating_txhash": "0xabc123"
        });
        let utxo: Utxo = serde_json::from_value(raw).unwrap();
        assert_eq!(utxo.amount, U256::from(100));
        assert_eq!(utxo.position(), UtxoPos::new(7000, 0, 1));
        let back = serde_json::to_value(&utxo).unwrap();
        assert_eq!(back["creating_txhash"], "0xabc123");
    }
}
