use std::sync::Arc;

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, PendingTransactionError, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportError;
use async_trait::async_trait;
#[cfg(any(feature = "testing", test))]
use mockall::automock;
use tracing::debug;
use url::Url;

pub type VerifierRpcResult<T> = Result<T, VerifierRpcError>;

pub type SharedVerifierRpc = Arc<dyn VerifierRpc>;

#[derive(thiserror::Error, Debug)]
pub enum VerifierRpcError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
    #[error("Deployment transaction {0} did not create a contract.")]
    MissingContractAddress(TxHash),
    #[error("Transaction {0} reverted.")]
    Reverted(TxHash),
}

/// The node operations the benchmark depends on.
#[cfg_attr(any(feature = "testing", test), automock)]
#[async_trait]
pub trait VerifierRpc: Send + Sync {
    /// The funded account that sends deployment and setup transactions.
    fn deployer(&self) -> Address;

    async fn chain_id(&self) -> VerifierRpcResult<u64>;

    /// Sends a contract creation transaction from the deployer and waits for its receipt.
    async fn deploy(&self, deploy_code: Bytes) -> VerifierRpcResult<Address>;

    /// Sends a call from the deployer and waits for its receipt.
    async fn transact(&self, to: Address, input: Bytes) -> VerifierRpcResult<TxHash>;

    /// Resolves once the node acknowledges the transaction, not when it is included.
    async fn send_raw_transaction(&self, raw: Bytes) -> VerifierRpcResult<TxHash>;

    /// `None` while the transaction has no receipt, otherwise whether it succeeded.
    async fn transaction_status(&self, tx_hash: TxHash) -> VerifierRpcResult<Option<bool>>;

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> VerifierRpcResult<u64>;
}

/// [`VerifierRpc`] over a JSON-RPC HTTP endpoint.
#[derive(Clone)]
pub struct AlloyVerifierRpc {
    provider: DynProvider,
    deployer: Address,
}

impl AlloyVerifierRpc {
    pub fn new(node_url: Url, deployer: PrivateKeySigner) -> Self {
        let deployer_address = deployer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(deployer))
            .connect_http(node_url)
            .erased();
        Self { provider, deployer: deployer_address }
    }

    async fn send_and_confirm(
        &self,
        request: TransactionRequest,
    ) -> VerifierRpcResult<TransactionReceipt> {
        let receipt = self.provider.send_transaction(request).await?.get_receipt().await?;
        debug!(
            "Transaction {} included in block {:?}.",
            receipt.transaction_hash, receipt.block_number
        );
        if !ReceiptResponse::status(&receipt) {
            return Err(VerifierRpcError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt)
    }
}

#[async_trait]
impl VerifierRpc for AlloyVerifierRpc {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn chain_id(&self) -> VerifierRpcResult<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn deploy(&self, deploy_code: Bytes) -> VerifierRpcResult<Address> {
        let request =
            TransactionRequest::default().with_from(self.deployer).with_deploy_code(deploy_code);
        let receipt = self.send_and_confirm(request).await?;
        receipt
            .contract_address
            .ok_or(VerifierRpcError::MissingContractAddress(receipt.transaction_hash))
    }

    async fn transact(&self, to: Address, input: Bytes) -> VerifierRpcResult<TxHash> {
        let request =
            TransactionRequest::default().with_from(self.deployer).with_to(to).with_input(input);
        Ok(self.send_and_confirm(request).await?.transaction_hash)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> VerifierRpcResult<TxHash> {
        let pending = self.provider.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_status(&self, tx_hash: TxHash) -> VerifierRpcResult<Option<bool>> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.as_ref().map(<TransactionReceipt as ReceiptResponse>::status))
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> VerifierRpcResult<u64> {
        let request = TransactionRequest::default().with_from(from).with_to(to).with_input(input);
        Ok(self.provider.estimate_gas(request).await?)
    }
}
