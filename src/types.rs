use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{NO_PROVIDER_MESSAGE, NO_ROUTES_MESSAGE};
use crate::wallet::ProviderError;

/// 카탈로그 토큰 (로드 후 불변)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// 심볼 (고유 키)
    pub symbol: String,
    /// 표시 이름
    pub name: String,
    /// 온체인 주소
    pub address: Address,
    /// 소수점 자릿수
    pub decimals: u8,
    /// 기준 USD 가격
    pub price: f64,
    /// 체인 ID
    pub chain_id: u64,
}

/// DEX 카탈로그 항목
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dex {
    /// 식별자 (고유 키)
    pub id: String,
    /// 표시 이름
    pub name: String,
    /// 고정 수수료 (%, 0.3 = 0.3%)
    pub fee: f64,
    pub router_address: Address,
    pub factory_address: Address,
    /// 비활성 DEX는 견적 계산에서 제외
    pub is_active: bool,
}

/// 단일 DEX의 시뮬레이션 견적
///
/// 요청마다 새로 생성되며 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub dex: Dex,
    pub input_token: Token,
    pub output_token: Token,
    pub input_amount: f64,
    pub output_amount: f64,
    /// 가격 영향 (%, 항상 0 이상)
    pub price_impact: f64,
    /// DEX 수수료 (%)
    pub fee: f64,
    /// 가스 추정량 (gas units)
    pub gas_estimate: u64,
    /// 유동성 풀 라벨 (예: "$12.3M")
    pub liquidity_pool: String,
    /// 슬리피지 추정치 (%)
    pub slippage: f64,
}

impl Route {
    /// 입력 1단위당 출력 수량
    pub fn effective_price(&self) -> f64 {
        self.output_amount / self.input_amount
    }

    pub fn pair_key(&self) -> String {
        pair_key(&self.input_token, &self.output_token)
    }
}

/// "FROM/TO" 형식의 페어 키
pub fn pair_key(from: &Token, to: &Token) -> String {
    format!("{}/{}", from.symbol, to.symbol)
}

/// DEX별 가격 비교 항목
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceComparison {
    pub dex_id: String,
    pub dex_name: String,
    /// 출력 / 입력
    pub price: f64,
    /// 최적 가격 대비 차이 (%)
    pub difference: f64,
}

/// 한 요청에 대한 라우트 집계
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub quote_id: Uuid,
    /// 출력 수량 내림차순
    pub routes: Vec<Route>,
    /// 항상 routes[0]
    pub best_route: Route,
    /// 전체 라우트 가스 추정량 합계
    pub total_gas_cost: Decimal,
    /// 예상 확인 시간 (초)
    pub estimated_time: f64,
    pub price_comparison: Vec<PriceComparison>,
    pub created_at: DateTime<Utc>,
}

/// 트랜잭션 비용 (USD)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TransactionCost {
    pub gas_cost_usd: f64,
    pub trading_fee_usd: f64,
    pub total_usd: f64,
}

/// 지갑 연결 상태
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// 지갑 세션 상태
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WalletState {
    pub status: ConnectionStatus,
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    /// 네이티브 통화 표시 단위 잔고 (예: "1.2345")
    pub balance: Option<String>,
}

impl WalletState {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

/// 구독자에게 노출되는 지갑 세션 스냅샷
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WalletSnapshot {
    pub wallet: WalletState,
    pub is_loading: bool,
    pub error: Option<String>,
    pub provider_available: bool,
}

/// Quote engine error types
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("{}", NO_ROUTES_MESSAGE)]
    NoRoutes,

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Unknown DEX: {0}")]
    UnknownDex(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Wallet session error types
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("{}", NO_PROVIDER_MESSAGE)]
    ProviderNotFound,

    #[error("Wallet provider returned no accounts")]
    NoAccounts,

    #[error("Failed to connect wallet: {0}")]
    Rejected(#[source] ProviderError),

    #[error("Failed to switch network: {0}")]
    SwitchNetwork(#[source] ProviderError),

    #[error("Invalid balance: {0}")]
    InvalidBalance(String),
}

/// Result type alias
pub type AggregatorResult<T> = Result<T, AggregatorError>;
pub type WalletResult<T> = Result<T, WalletError>;
