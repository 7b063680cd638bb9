//! HTTP client for a Horizon-style ledger query API.

use crate::client::{
    ClaimableBalance, LedgerOperation, LedgerQuery, TrustlineHolder, TxPage, TxRecord, TxScope,
};
use crate::errors::{LedgerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledgermark_types::AssetRef;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Default per-call timeout. Ledger query latency varies widely; one slow
/// page fetch must not block unrelated requests.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Lightweight read-only client for the ledger's HTTP query API.
#[derive(Clone, Debug)]
pub struct HorizonClient {
    client: reqwest::Client,
    base_url: String,
}

impl HorizonClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, call_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(call_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn asset_param(asset: &AssetRef) -> String {
        format!("{}:{}", asset.code, asset.issuer)
    }

    async fn fetch_records<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self.client.get(url).query(query).send().await?;

        match response.status() {
            StatusCode::OK => {
                let page = response.json::<EmbeddedPage<T>>().await?;
                Ok(page.embedded.records)
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status => Err(LedgerError::Rpc(format!(
                "ledger query failed (status {status})"
            ))),
        }
    }
}

#[async_trait]
impl LedgerQuery for HorizonClient {
    async fn trustline_holders(&self, asset: &AssetRef) -> Result<Vec<TrustlineHolder>> {
        let records: Vec<AccountDto> = self
            .fetch_records(
                self.endpoint("accounts"),
                &[
                    ("asset", Self::asset_param(asset)),
                    ("limit", "200".to_string()),
                ],
            )
            .await?;

        Ok(records
            .into_iter()
            .map(|account| {
                let balance = account
                    .balances
                    .iter()
                    .find(|line| {
                        line.asset_code.as_deref() == Some(asset.code.as_str())
                            && line.asset_issuer.as_deref() == Some(asset.issuer.as_str())
                    })
                    .map(|line| line.balance.clone())
                    .unwrap_or_else(|| "0".to_string());
                TrustlineHolder {
                    account: account.id,
                    balance,
                }
            })
            .collect())
    }

    async fn claimable_balances(&self, asset: &AssetRef) -> Result<Vec<ClaimableBalance>> {
        let records: Vec<ClaimableBalanceDto> = self
            .fetch_records(
                self.endpoint("claimable_balances"),
                &[
                    ("asset", Self::asset_param(asset)),
                    ("limit", "10".to_string()),
                ],
            )
            .await?;

        Ok(records
            .into_iter()
            .map(|record| ClaimableBalance {
                id: record.id,
                claimants: record
                    .claimants
                    .into_iter()
                    .map(|claimant| claimant.destination)
                    .collect(),
                amount: record.amount,
            })
            .collect())
    }

    async fn transactions(
        &self,
        scope: &TxScope,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<TxPage> {
        let url = match scope {
            TxScope::Account(account) => self.endpoint(&format!("accounts/{account}/transactions")),
            TxScope::Global => self.endpoint("transactions"),
        };

        let mut query = vec![
            ("order", "desc".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let records: Vec<TxDto> = self.fetch_records(url, &query).await?;
        let next_cursor = records.last().map(|tx| tx.paging_token.clone());

        Ok(TxPage {
            records: records.into_iter().map(TxDto::into_record).collect(),
            next_cursor,
        })
    }

    async fn operations(&self, tx_hash: &str) -> Result<Vec<LedgerOperation>> {
        let records: Vec<OperationDto> = self
            .fetch_records(
                self.endpoint(&format!("transactions/{tx_hash}/operations")),
                &[("limit", "200".to_string())],
            )
            .await?;

        Ok(records.into_iter().map(OperationDto::into_operation).collect())
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddedPage<T> {
    #[serde(rename = "_embedded")]
    embedded: Records<T>,
}

#[derive(Debug, Deserialize)]
struct Records<T> {
    records: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    id: String,
    #[serde(default)]
    balances: Vec<BalanceLineDto>,
}

#[derive(Debug, Deserialize)]
struct BalanceLineDto {
    balance: String,
    asset_code: Option<String>,
    asset_issuer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaimableBalanceDto {
    id: String,
    amount: String,
    #[serde(default)]
    claimants: Vec<ClaimantDto>,
}

#[derive(Debug, Deserialize)]
struct ClaimantDto {
    destination: String,
}

#[derive(Debug, Deserialize)]
struct TxDto {
    hash: String,
    source_account: String,
    memo: Option<String>,
    memo_type: Option<String>,
    created_at: DateTime<Utc>,
    paging_token: String,
}

impl TxDto {
    fn into_record(self) -> TxRecord {
        // Only plain-text memos can carry domain events.
        let memo = match self.memo_type.as_deref() {
            Some("text") | None => self.memo,
            _ => None,
        };
        TxRecord {
            hash: self.hash,
            source_account: self.source_account,
            memo,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OperationDto {
    #[serde(rename = "type")]
    kind: String,
    to: Option<String>,
    account: Option<String>,
    #[serde(default)]
    claimants: Vec<ClaimantDto>,
}

impl OperationDto {
    fn into_operation(self) -> LedgerOperation {
        match self.kind.as_str() {
            "payment" => match self.to {
                Some(destination) => LedgerOperation::Payment { destination },
                None => LedgerOperation::Other,
            },
            "create_account" => match self.account {
                Some(destination) => LedgerOperation::CreateAccount { destination },
                None => LedgerOperation::Other,
            },
            "create_claimable_balance" => LedgerOperation::CreateClaimableBalance {
                claimants: self
                    .claimants
                    .into_iter()
                    .map(|claimant| claimant.destination)
                    .collect(),
            },
            _ => LedgerOperation::Other,
        }
    }
}
