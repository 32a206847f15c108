use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// 지갑 프로바이더 에러 타입
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Provider RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// 프로바이더가 푸시하는 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

/// 이벤트 구독 핸들
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// 지갑 프로바이더 트레이트
///
/// 세션 매니저가 사용하는 최소한의 기능만 정의합니다.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// 계정 접근 요청 (승인 프롬프트가 뜰 수 있음)
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// 이미 승인된 계정 조회 (프롬프트 없음)
    async fn authorized_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// 네이티브 통화 최소 단위 잔고 (wei)
    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// accountsChanged / chainChanged 이벤트 구독
    fn subscribe(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<ProviderEvent>);

    fn unsubscribe(&self, id: SubscriptionId);
}
