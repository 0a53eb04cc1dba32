//! Pre-signs one verification transaction per ephemeral client.

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use futures::future::try_join_all;
use rand::RngCore;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::errors::{SigningError, SigningResult};

#[cfg(test)]
#[path = "tx_factory_test.rs"]
mod tx_factory_test;

/// The call every client sends: same recipient, same bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerificationCall {
    pub contract: Address,
    pub payload: Bytes,
}

/// An EIP-2718 encoded transaction ready for `eth_sendRawTransaction`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedVerification {
    pub sender: Address,
    pub tx_hash: TxHash,
    pub raw: Bytes,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IdentitySource {
    #[default]
    Random,
    Seeded(u64),
}

impl IdentitySource {
    fn rng(self) -> ChaCha20Rng {
        match self {
            Self::Random => ChaCha20Rng::from_entropy(),
            Self::Seeded(seed) => ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TxFactory {
    chain_id: u64,
    gas_limit: u64,
    gas_price: u128,
    identities: IdentitySource,
}

impl TxFactory {
    pub fn new(chain_id: u64, gas_limit: u64, gas_price: u128, identities: IdentitySource) -> Self {
        Self { chain_id, gas_limit, gas_price, identities }
    }

    /// Signs `n_clients` transactions, each from a fresh key with nonce 0. Output order matches
    /// client index.
    pub async fn sign_all(
        &self,
        call: &VerificationCall,
        n_clients: usize,
    ) -> SigningResult<Vec<SignedVerification>> {
        let identities = self.ephemeral_identities(n_clients)?;
        let signed = try_join_all(
            identities
                .into_iter()
                .enumerate()
                .map(|(index, identity)| self.sign(index, identity, call)),
        )
        .await?;
        debug!("Signed {} transactions to {}.", signed.len(), call.contract);
        Ok(signed)
    }

    fn ephemeral_identities(&self, n_clients: usize) -> SigningResult<Vec<PrivateKeySigner>> {
        let mut rng = self.identities.rng();
        (0..n_clients)
            .map(|index| {
                let mut secret = B256::ZERO;
                rng.fill_bytes(secret.as_mut_slice());
                PrivateKeySigner::from_bytes(&secret)
                    .map_err(|e| SigningError::KeyGeneration { index, reason: e.to_string() })
            })
            .collect()
    }

    async fn sign(
        &self,
        index: usize,
        identity: PrivateKeySigner,
        call: &VerificationCall,
    ) -> SigningResult<SignedVerification> {
        let sender = identity.address();
        let request = TransactionRequest::default()
            .with_from(sender)
            .with_to(call.contract)
            .with_nonce(0)
            .with_value(U256::ZERO)
            .with_input(call.payload.clone())
            .with_gas_limit(self.gas_limit)
            .with_gas_price(self.gas_price)
            .with_chain_id(self.chain_id);
        let envelope = request
            .build(&EthereumWallet::from(identity))
            .await
            .map_err(|e| SigningError::Sign { index, reason: e.to_string() })?;
        Ok(SignedVerification {
            sender,
            tx_hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }
}
