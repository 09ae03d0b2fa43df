//! Typed structured-data authorization payloads.
//!
//! A child-chain transfer is authorized by signing a typed-data digest of the
//! transaction body, domain-separated by the root-chain verifying contract.
//! The schema is fixed: five input slots (four funding plus one fee), four
//! output slots, and a metadata word; unused slots are zero-filled.

use crate::currency::Currency;
use crate::transaction::{Output, TransferBody, MAX_TX_INPUTS, MAX_TX_OUTPUTS};
use crate::utxo::UtxoPos;
use serde_json::{json, Value};
use web3::ethabi::{self, Token};
use web3::signing::keccak256;
use web3::types::{Address, H256, U256};

const DOMAIN_NAME: &str = "Plasma Framework";
const DOMAIN_VERSION: &str = "1";
// Fixed domain salt, shared with the verifying contract.
const DOMAIN_SALT: [u8; 32] = [
    0x14, 0x9a, 0xcf, 0x0a, 0x7d, 0x3c, 0x45, 0x12, 0xb1, 0xcf, 0x0e, 0x5a, 0x9d, 0x33, 0x81,
    0x4b, 0x27, 0x6e, 0x84, 0x10, 0x55, 0xc2, 0xf9, 0x60, 0x3e, 0x0c, 0x7b, 0xa1, 0x4d, 0x28,
    0x9f, 0x06,
];

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,address verifyingContract,bytes32 salt)";
const TRANSACTION_TYPE: &str = "Transaction(\
    Input input0,Input input1,Input input2,Input input3,Input input4,\
    Output output0,Output output1,Output output2,Output output3,\
    bytes32 metadata)\
    Input(uint256 blknum,uint256 txindex,uint256 oindex)\
    Output(address owner,address currency,uint256 amount)";
const INPUT_TYPE: &str = "Input(uint256 blknum,uint256 txindex,uint256 oindex)";
const OUTPUT_TYPE: &str = "Output(address owner,address currency,uint256 amount)";

/// A typed-data payload ready for provider-mediated or direct key signing.
#[derive(Clone, Debug)]
pub struct TypedData {
    pub verifying_contract: Address,
    pub body: TransferBody,
}

impl TypedData {
    pub fn new(body: TransferBody, verifying_contract: Address) -> Self {
        Self {
            verifying_contract,
            body,
        }
    }

    /// The JSON form handed to a typed-data signing provider.
    pub fn to_value(&self) -> Value {
        let inputs: Vec<Value> = (0..MAX_TX_INPUTS)
            .map(|i| {
                let pos = self
                    .body
                    .inputs
                    .get(i)
                    .map(|u| u.position())
                    .unwrap_or(UtxoPos::new(0, 0, 0));
                json!({
                    "blknum": pos.blknum,
                    "txindex": pos.txindex,
                    "oindex": pos.oindex,
                })
            })
            .collect();
        let outputs: Vec<Value> = (0..MAX_TX_OUTPUTS)
            .map(|i| {
                let out = self.body.outputs.get(i).cloned().unwrap_or(Output {
                    owner: Address::zero(),
                    currency: Currency::native(),
                    amount: U256::zero(),
                });
                json!({
                    "owner": format!("{:#x}", out.owner),
                    "currency": format!("{:#x}", out.currency.address()),
                    "amount": out.amount.to_string(),
                })
            })
            .collect();

        let mut message = serde_json::Map::new();
        for (i, input) in inputs.into_iter().enumerate() {
            message.insert(format!("input{i}"), input);
        }
        for (i, output) in outputs.into_iter().enumerate() {
            message.insert(format!("output{i}"), output);
        }
        message.insert("metadata".into(), json!(format!("0x{}", hex::encode([0u8; 32]))));

        json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "verifyingContract", "type": "address" },
                    { "name": "salt", "type": "bytes32" },
                ],
                "Transaction": [
                    { "name": "input0", "type": "Input" },
                    { "name": "input1", "type": "Input" },
                    { "name": "input2", "type": "Input" },
                    { "name": "input3", "type": "Input" },
                    { "name": "input4", "type": "Input" },
                    { "name": "output0", "type": "Output" },
                    { "name": "output1", "type": "Output" },
                    { "name": "output2", "type": "Output" },
                    { "name": "output3", "type": "Output" },
                    { "name": "metadata", "type": "bytes32" },
                ],
                "Input": [
                    { "name": "blknum", "type": "uint256" },
                    { "name": "txindex", "type": "uint256" },
                    { "name": "oindex", "type": "uint256" },
                ],
                "Output": [
                    { "name": "owner", "type": "address" },
                    { "name": "currency", "type": "address" },
                    { "name": "amount", "type": "uint256" },
                ],
            },
            "primaryType": "Transaction",
            "domain": {
                "name": DOMAIN_NAME,
                "version": DOMAIN_VERSION,
                "verifyingContract": format!("{:#x}", self.verifying_contract),
                "salt": format!("0x{}", hex::encode(DOMAIN_SALT)),
            },
            "message": Value::Object(message),
        })
    }

    /// The 32-byte digest that authorizes this transfer:
    /// `keccak256(0x19 ‖ 0x01 ‖ domain_separator ‖ struct_hash)`.
    pub fn signing_hash(&self) -> H256 {
        let domain_separator = self.domain_separator();
        let struct_hash = self.struct_hash();
        let mut preimage = Vec::with_capacity(2 + 32 + 32);
        preimage.extend_from_slice(&[0x19, 0x01]);
        preimage.extend_from_slice(&domain_separator);
        preimage.extend_from_slice(&struct_hash);
        H256(keccak256(&preimage))
    }

    fn domain_separator(&self) -> [u8; 32] {
        keccak256(&ethabi::encode(&[
            Token::FixedBytes(keccak256(DOMAIN_TYPE.as_bytes()).to_vec()),
            Token::FixedBytes(keccak256(DOMAIN_NAME.as_bytes()).to_vec()),
            Token::FixedBytes(keccak256(DOMAIN_VERSION.as_bytes()).to_vec()),
            Token::Address(self.verifying_contract),
            Token::FixedBytes(DOMAIN_SALT.to_vec()),
        ]))
    }

    fn struct_hash(&self) -> [u8; 32] {
        let mut tokens = vec![Token::FixedBytes(
            keccak256(TRANSACTION_TYPE.as_bytes()).to_vec(),
        )];
        for i in 0..MAX_TX_INPUTS {
            let pos = self
                .body
                .inputs
                .get(i)
                .map(|u| u.position())
                .unwrap_or(UtxoPos::new(0, 0, 0));
            tokens.push(Token::FixedBytes(hash_input(&pos).to_vec()));
        }
        for i in 0..MAX_TX_OUTPUTS {
            let out = self.body.outputs.get(i).cloned().unwrap_or(Output {
                owner: Address::zero(),
                currency: Currency::native(),
                amount: U256::zero(),
            });
            tokens.push(Token::FixedBytes(hash_output(&out).to_vec()));
        }
        tokens.push(Token::FixedBytes(vec![0u8; 32])); // metadata
        keccak256(&ethabi::encode(&tokens))
    }
}

fn hash_input(pos: &UtxoPos) -> [u8; 32] {
    keccak256(&ethabi::encode(&[
        Token::FixedBytes(keccak256(INPUT_TYPE.as_bytes()).to_vec()),
        Token::Uint(U256::from(pos.blknum)),
        Token::Uint(U256::from(pos.txindex)),
        Token::Uint(U256::from(pos.oindex)),
    ]))
}

fn hash_output(out: &Output) -> [u8; 32] {
    keccak256(&ethabi::encode(&[
        Token::FixedBytes(keccak256(OUTPUT_TYPE.as_bytes()).to_vec()),
        Token::Address(out.owner),
        Token::Address(out.currency.address()),
        Token::Uint(out.amount),
    ]))
}
