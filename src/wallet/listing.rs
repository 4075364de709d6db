use serde::{Deserialize, Serialize};

use super::Wallet;
use crate::cancel::CancelToken;
use crate::client::{ListingReceipt, ListingSubmission, ListingUtxo};
use crate::error::{Result, WalletError};
use crate::inscriptions::{TokenAmount, TransferableInscription};

/// Offer of one transfer inscription for sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub inscription_id: String,
    /// `txid:vout` the inscription was discovered at
    pub outpoint: String,
    pub tick: String,
    pub amount: TokenAmount,
    /// Asking price in koinu
    pub price: u64,
}

impl ListingRequest {
    pub fn from_transferable(inscription: &TransferableInscription, price: u64) -> Self {
        Self {
            inscription_id: inscription.inscription_id.clone(),
            outpoint: inscription.outpoint.clone(),
            tick: inscription.tick.clone(),
            amount: inscription.amount,
            price,
        }
    }
}

impl Wallet {
    /// List a transfer inscription on the marketplace.
    ///
    /// Every step must succeed; nothing is stored locally until the
    /// marketplace accepts the listing. The cancel token is checked
    /// between steps.
    pub async fn list_token_for_sale(
        &self,
        request: &ListingRequest,
        cancel: &CancelToken,
    ) -> Result<ListingReceipt> {
        log::info!(
            "Listing {} {} ({}) for {} koinu",
            request.amount,
            request.tick,
            request.inscription_id,
            request.price
        );

        cancel.check()?;
        self.utxos.refresh(true).await?;

        cancel.check()?;
        let current = self.utxos.fetch_uncached().await?;

        cancel.check()?;
        let tip = self.services.utxo_indexer.best_block().await?;
        if !tip.success {
            return Err(WalletError::IndexerNotSynced);
        }
        log::debug!("Indexer tip {:?}", tip.hash);

        let utxo = current
            .find(&request.outpoint)
            .ok_or_else(|| WalletError::InscriptionUtxoNotFound {
                inscription_id: request.inscription_id.clone(),
                outpoint: request.outpoint.clone(),
            })?;

        cancel.check()?;
        let outputs = self
            .services
            .utxo_indexer
            .transaction_outputs(&utxo.txid)
            .await?;
        let script = outputs
            .iter()
            .find(|output| {
                output.index == utxo.vout && output.address.as_deref() == Some(self.address())
            })
            .map(|output| output.script.clone())
            .ok_or_else(|| WalletError::ScriptNotFound {
                outpoint: request.outpoint.clone(),
                address: self.address().to_string(),
            })?;

        let submission = ListingSubmission {
            tick: request.tick.clone(),
            price: request.price,
            amount: request.amount.to_string(),
            seller_address: self.address().to_string(),
            inscription_id: request.inscription_id.clone(),
            utxo: ListingUtxo {
                txid: utxo.txid.clone(),
                vout: utxo.vout,
                value: utxo.satoshis,
                script,
            },
        };

        cancel.check()?;
        let receipt = self.services.token_api.submit_listing(&submission).await?;
        if !receipt.success {
            let reason = receipt
                .message
                .unwrap_or_else(|| "no reason given".to_string());
            log::warn!("Listing of {} rejected: {}", request.inscription_id, reason);
            return Err(WalletError::ListingRejected(reason));
        }

        log::info!(
            "Listed {} as {}",
            request.inscription_id,
            receipt.listing_id.as_deref().unwrap_or("<unnamed>")
        );
        Ok(receipt)
    }
}
