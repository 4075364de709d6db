use futures::future::join_all;
use std::sync::Arc;

use super::{Inscription, InscriptionMap, TokenAmount, TokenPayload, TransferableInscription};
use crate::client::{TokenApi, TransferCheck};

/// Narrows discovered inscriptions to unconsumed transfers of one ticker.
///
/// An inscription qualifies only when the ledger reports a remaining amount
/// exactly equal to the inscribed one; a partially consumed transfer is not
/// transferable.
pub struct TransferableFilter {
    token_api: Arc<dyn TokenApi>,
}

impl TransferableFilter {
    pub fn new(token_api: Arc<dyn TokenApi>) -> Self {
        Self { token_api }
    }

    pub async fn filter(
        &self,
        tick: &str,
        inscriptions: &InscriptionMap,
    ) -> Vec<TransferableInscription> {
        let candidates: Vec<_> = inscriptions
            .values()
            .filter_map(|inscription| candidate(inscription, tick))
            .collect();

        log::debug!(
            "{} of {} inscriptions are {} transfer candidates",
            candidates.len(),
            inscriptions.len(),
            tick
        );

        let checks = candidates
            .into_iter()
            .map(|(inscription, payload, amount)| async move {
                match self.token_api.single_transferable(&inscription.id).await {
                    Ok(check) => confirm(inscription, payload, amount, check),
                    Err(e) => {
                        log::warn!("Transferable check for {} failed: {}", inscription.id, e);
                        None
                    }
                }
            });

        join_all(checks).await.into_iter().flatten().collect()
    }
}

/// Text transfer inscriptions of `tick` with a parsable, non-zero amount
fn candidate<'a>(
    inscription: &'a Inscription,
    tick: &str,
) -> Option<(&'a Inscription, TokenPayload, TokenAmount)> {
    let payload = TokenPayload::parse(inscription.data.as_deref()?)?;
    if !payload.is_transfer() || !payload.matches_tick(tick) {
        return None;
    }
    let amount = match TokenAmount::from_decimal(payload.amt.as_deref()?) {
        Ok(amount) if !amount.is_zero() => amount,
        Ok(_) => return None,
        Err(e) => {
            log::debug!("Inscription {} has unusable amount: {}", inscription.id, e);
            return None;
        }
    };
    Some((inscription, payload, amount))
}

fn confirm(
    inscription: &Inscription,
    payload: TokenPayload,
    amount: TokenAmount,
    check: TransferCheck,
) -> Option<TransferableInscription> {
    let remaining = check.remaining?;
    if remaining != amount {
        log::debug!(
            "Inscription {} has {} of {} remaining",
            inscription.id,
            remaining,
            amount
        );
        return None;
    }

    Some(TransferableInscription {
        inscription_id: inscription.id.clone(),
        number: check.inscription_number,
        amount,
        tick: payload.tick,
        outpoint: inscription.outpoint.clone(),
        data: inscription.data.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTokenApi;

    fn inscription(id: &str, data: Option<&str>) -> Inscription {
        Inscription {
            id: id.to_string(),
            data: data.map(str::to_string),
            content_type: Some("text/plain;charset=utf-8".to_string()),
            outpoint: format!("{}:0", id.trim_end_matches("i0")),
        }
    }

    fn map(items: Vec<Inscription>) -> InscriptionMap {
        items.into_iter().map(|i| (i.id.clone(), i)).collect()
    }

    #[tokio::test]
    async fn test_filters_by_tick_and_remaining_amount() {
        let api = Arc::new(FakeTokenApi::new());
        api.set_remaining("full", "1000000000000000000000", Some(42));
        api.set_remaining("partial", "400000000000000000000", Some(43));
        api.set_remaining("other", "1000000000000000000000", Some(44));
        api.set_remaining("spent", "0", None);

        let transfer = r#"{"p":"tap","op":"token-transfer","tick":"DOGI","amt":"1000"}"#;
        let inscriptions = map(vec![
            inscription("full", Some(transfer)),
            inscription("partial", Some(transfer)),
            inscription(
                "other",
                Some(r#"{"p":"tap","op":"token-transfer","tick":"wow","amt":"1000"}"#),
            ),
            inscription("spent", Some(transfer)),
            inscription("image", None),
            inscription(
                "mint",
                Some(r#"{"p":"tap","op":"token-mint","tick":"dogi","amt":"1000"}"#),
            ),
        ]);

        let filter = TransferableFilter::new(api.clone());
        let found = filter.filter("dogi", &inscriptions).await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].inscription_id, "full");
        assert_eq!(found[0].number, Some(42));
        assert_eq!(found[0].amount.to_string(), "1000");
        assert_eq!(found[0].outpoint, "full:0");
        // Only dogi transfers reach the ledger
        assert_eq!(api.transferable_calls(), 3);
    }

    #[tokio::test]
    async fn test_large_numeric_remaining_matches() {
        let api = Arc::new(FakeTokenApi::new());
        let body: serde_json::Value =
            serde_json::from_str(r#"{ "result": 123456789000000000000000000 }"#).unwrap();
        api.set_transfer_check("whale", body);

        let transfer = r#"{"p":"tap","op":"token-transfer","tick":"dogi","amt":"123456789"}"#;
        let found = TransferableFilter::new(api)
            .filter("dogi", &map(vec![inscription("whale", Some(transfer))]))
            .await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].amount.to_string(), "123456789");
    }

    #[tokio::test]
    async fn test_failed_check_is_excluded() {
        let api = Arc::new(FakeTokenApi::new());
        api.set_remaining("ok", "5000000000000000000", None);
        api.fail_transferable("broken");

        let transfer = r#"{"p":"tap","op":"token-transfer","tick":"dogi","amt":"5"}"#;
        let inscriptions = map(vec![
            inscription("ok", Some(transfer)),
            inscription("broken", Some(transfer)),
        ]);

        let found = TransferableFilter::new(api)
            .filter("dogi", &inscriptions)
            .await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].inscription_id, "ok");
        assert_eq!(found[0].number, None);
    }
}
