use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use crate::wallet::{ProviderError, ProviderEvent, SubscriptionId, WalletProvider};

/// Mock 지갑 프로바이더
///
/// 브라우저 지갑 확장 없이 계정 승인, 체인 전환, 이벤트 푸시를 시뮬레이션합니다.
#[derive(Debug)]
pub struct MockWalletProvider {
    accounts: RwLock<Vec<Address>>,
    authorized: AtomicBool,
    chain_id: AtomicU64,
    balances: DashMap<Address, U256>,
    latency: Duration,
    balance_latency: Duration,
    reject_requests: AtomicBool,
    fail_switch: AtomicBool,
    subscribers: DashMap<u64, mpsc::UnboundedSender<ProviderEvent>>,
    next_subscription: AtomicU64,
    request_calls: AtomicU64,
    unsubscribe_calls: AtomicU64,
}

impl MockWalletProvider {
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Self {
        Self {
            accounts: RwLock::new(accounts),
            authorized: AtomicBool::new(false),
            chain_id: AtomicU64::new(chain_id),
            balances: DashMap::new(),
            latency: Duration::ZERO,
            balance_latency: Duration::ZERO,
            reject_requests: AtomicBool::new(false),
            fail_switch: AtomicBool::new(false),
            subscribers: DashMap::new(),
            next_subscription: AtomicU64::new(1),
            request_calls: AtomicU64::new(0),
            unsubscribe_calls: AtomicU64::new(0),
        }
    }

    pub fn with_balance(self, address: Address, wei: U256) -> Self {
        self.balances.insert(address, wei);
        self
    }

    /// 이미 승인된 상태로 시작
    pub fn authorized(self) -> Self {
        self.authorized.store(true, Ordering::SeqCst);
        self
    }

    /// 모든 요청에 적용되는 응답 지연
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// get_balance 에만 적용되는 응답 지연
    pub fn with_balance_latency(mut self, latency: Duration) -> Self {
        self.balance_latency = latency;
        self
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        if let Ok(mut current) = self.accounts.write() {
            *current = accounts;
        }
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    pub fn set_reject_requests(&self, reject: bool) {
        self.reject_requests.store(reject, Ordering::SeqCst);
    }

    pub fn set_fail_switch(&self, fail: bool) {
        self.fail_switch.store(fail, Ordering::SeqCst);
    }

    /// 모든 구독자에게 이벤트 푸시
    pub fn emit(&self, event: ProviderEvent) {
        match &event {
            ProviderEvent::AccountsChanged(accounts) => self.set_accounts(accounts.clone()),
            ProviderEvent::ChainChanged(chain_id) => self.chain_id.store(*chain_id, Ordering::SeqCst),
        }

        for subscriber in self.subscribers.iter() {
            let _ = subscriber.value().send(event.clone());
        }
        debug!("🎭 Mock 이벤트 전송: {:?} ({} 구독자)", event, self.subscribers.len());
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscribers.len()
    }

    pub fn unsubscribe_count(&self) -> u64 {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    /// request_accounts 호출 횟수 (승인 프롬프트 횟수)
    pub fn request_count(&self) -> u64 {
        self.request_calls.load(Ordering::SeqCst)
    }

    fn current_accounts(&self) -> Vec<Address> {
        self.accounts.read().map(|accounts| accounts.clone()).unwrap_or_default()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.reject_requests.load(Ordering::SeqCst) {
            return Err(ProviderError::UserRejected);
        }

        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.current_accounts())
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.simulate_latency().await;

        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.current_accounts())
        } else {
            Ok(Vec::new())
        }
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        if !self.balance_latency.is_zero() {
            tokio::time::sleep(self.balance_latency).await;
        }
        Ok(self.balances.get(&address).map(|balance| *balance).unwrap_or(U256::ZERO))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        self.simulate_latency().await;

        if self.fail_switch.load(Ordering::SeqCst) {
            return Err(ProviderError::Rpc {
                code: 4902,
                message: format!("Unrecognized chain ID {}", chain_id),
            });
        }

        if self.chain_id.load(Ordering::SeqCst) != chain_id {
            self.emit(ProviderEvent::ChainChanged(chain_id));
        }
        Ok(())
    }

    fn subscribe(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<ProviderEvent>) {
        let id = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.insert(id, sender);
        (SubscriptionId(id), receiver)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscribers.remove(&id.0).is_some() {
            self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        }
    }
}
