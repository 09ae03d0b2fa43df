//! Web3-backed root-chain client.

use crate::confirmation::{confirm, ReceiptSource, WatchConfig};
use crate::error::RootChainError;
use async_trait::async_trait;
use tracing::info;
use web3::ethabi::{self, ParamType, Token};
use web3::signing::keccak256;
use web3::transports::Http;
use web3::types::{
    Address, Block, BlockId, BlockNumber, Bytes, CallRequest, Transaction, TransactionId,
    TransactionReceipt, TransactionRequest, H256, U256,
};
use web3::Web3;

/// The root-chain operations the session depends on, beyond the receipt
/// primitives of [`ReceiptSource`].
#[async_trait]
pub trait RootChainApi: ReceiptSource {
    /// The accounts the connected provider controls.
    async fn accounts(&self) -> Result<Vec<Address>, RootChainError>;

    /// Native balance of an address, in wei.
    async fn balance(&self, address: Address) -> Result<U256, RootChainError>;

    /// The display symbol a token contract reports for itself.
    async fn token_symbol(&self, token: Address) -> Result<String, RootChainError>;

    /// Deposit native value into the child chain. Returns once a receipt
    /// exists; burial depth is the caller's concern.
    async fn deposit_native(
        &self,
        payload: Vec<u8>,
        amount: U256,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError>;

    /// Deposit previously-approved token value into the child chain.
    async fn deposit_token(
        &self,
        payload: Vec<u8>,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError>;

    /// Grant the deposit contract an allowance on a token. Returns the
    /// transaction hash; the caller decides how deeply to confirm it.
    async fn approve_token(
        &self,
        token: Address,
        amount: U256,
        from: Address,
    ) -> Result<H256, RootChainError>;

    /// Start a standard exit for one output.
    async fn start_standard_exit(
        &self,
        utxo_pos: U256,
        txbytes: Bytes,
        proof: Bytes,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError>;
}

/// Client for the root chain's deposit/exit contract over a web3 HTTP
/// provider.
#[derive(Clone)]
pub struct RootChainClient {
    web3: Web3<Http>,
    contract: Address,
}

impl RootChainClient {
    /// Connect to a root-chain node and bind the deposit/exit contract.
    pub fn new(node_url: &str, contract: Address) -> Result<Self, RootChainError> {
        let transport = Http::new(node_url)?;
        Ok(Self {
            web3: Web3::new(transport),
            contract,
        })
    }

    /// The bound deposit/exit contract address.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// The underlying transport, shared with the typed-data signer.
    pub fn transport(&self) -> Http {
        self.web3.transport().clone()
    }

    /// Submit a transaction and wait for its receipt to exist.
    async fn submit(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionReceipt, RootChainError> {
        let hash = self.web3.eth().send_transaction(request).await?;
        confirm(self, hash, &WatchConfig::receipt_only())
            .await
            .map_err(|e| RootChainError::Unconfirmed(hash, e.to_string()))
    }
}

/// The first four bytes of the keccak hash of a function signature.
fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn call_data(signature: &str, params: &[Token]) -> Bytes {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&ethabi::encode(params));
    Bytes(data)
}

#[async_trait]
impl ReceiptSource for RootChainClient {
    async fn transaction_receipt(
        &self,
        hash: H256,
    ) -> Result<Option<TransactionReceipt>, RootChainError> {
        Ok(self.web3.eth().transaction_receipt(hash).await?)
    }

    async fn block(&self, number: BlockNumber) -> Result<Option<Block<H256>>, RootChainError> {
        Ok(self.web3.eth().block(BlockId::Number(number)).await?)
    }

    async fn transaction(&self, hash: H256) -> Result<Option<Transaction>, RootChainError> {
        Ok(self
            .web3
            .eth()
            .transaction(TransactionId::Hash(hash))
            .await?)
    }
}

#[async_trait]
impl RootChainApi for RootChainClient {
    async fn accounts(&self) -> Result<Vec<Address>, RootChainError> {
        Ok(self.web3.eth().accounts().await?)
    }

    async fn balance(&self, address: Address) -> Result<U256, RootChainError> {
        Ok(self.web3.eth().balance(address, None).await?)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, RootChainError> {
        let request = CallRequest {
            to: Some(token),
            data: Some(call_data("symbol()", &[])),
            ..Default::default()
        };
        let raw = self.web3.eth().call(request, None).await?;
        let mut tokens = ethabi::decode(&[ParamType::String], &raw.0)
            .map_err(|e| RootChainError::InvalidResponse(format!("symbol(): {e}")))?;
        match tokens.pop() {
            Some(Token::String(symbol)) => Ok(symbol),
            _ => Err(RootChainError::InvalidResponse(
                "symbol() returned no string".into(),
            )),
        }
    }

    async fn deposit_native(
        &self,
        payload: Vec<u8>,
        amount: U256,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError> {
        info!("submitting native deposit of {amount} wei from {from:#x}");
        self.submit(TransactionRequest {
            from,
            to: Some(self.contract),
            value: Some(amount),
            data: Some(call_data("deposit(bytes)", &[Token::Bytes(payload)])),
            ..Default::default()
        })
        .await
    }

    async fn deposit_token(
        &self,
        payload: Vec<u8>,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError> {
        info!("submitting token deposit from {from:#x}");
        self.submit(TransactionRequest {
            from,
            to: Some(self.contract),
            data: Some(call_data("depositFrom(bytes)", &[Token::Bytes(payload)])),
            ..Default::default()
        })
        .await
    }

    async fn approve_token(
        &self,
        token: Address,
        amount: U256,
        from: Address,
    ) -> Result<H256, RootChainError> {
        info!("approving {amount} on token {token:#x} for {:#x}", self.contract);
        let request = TransactionRequest {
            from,
            to: Some(token),
            data: Some(call_data(
                "approve(address,uint256)",
                &[Token::Address(self.contract), Token::Uint(amount)],
            )),
            ..Default::default()
        };
        Ok(self.web3.eth().send_transaction(request).await?)
    }

    async fn start_standard_exit(
        &self,
        utxo_pos: U256,
        txbytes: Bytes,
        proof: Bytes,
        from: Address,
    ) -> Result<TransactionReceipt, RootChainError> {
        info!("starting standard exit for position {utxo_pos} from {from:#x}");
        self.submit(TransactionRequest {
            from,
            to: Some(self.contract),
            data: Some(call_data(
                "startStandardExit(uint256,bytes,bytes)",
                &[
                    Token::Uint(utxo_pos),
                    Token::Bytes(txbytes.0),
                    Token::Bytes(proof.0),
                ],
            )),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_first_four_hash_bytes() {
        // well-known ERC-20 selector
        assert_eq!(selector("approve(address,uint256)"), [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn call_data_prepends_selector() {
        let data = call_data("approve(address,uint256)", &[
            Token::Address(Address::zero()),
            Token::Uint(U256::from(1)),
        ]);
        assert_eq!(&data.0[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(data.0.len(), 4 + 64);
    }

    #[test]
    fn deposit_payload_feeds_currency_through() {
        let payload = plasma_types::transaction::encode_deposit(
            Address::from_low_u64_be(1),
            U256::from(10),
            plasma_types::Currency::native(),
        );
        let data = call_data("deposit(bytes)", &[Token::Bytes(payload)]);
        assert_eq!(&data.0[..4], &selector("deposit(bytes)")[..]);
    }
}
