use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::provider::{ProviderEvent, SubscriptionId, WalletProvider};
use crate::catalog::Catalog;
use crate::common::formatting::{format_units_fixed, short_address};
use crate::config::WalletConfig;
use crate::types::{ConnectionStatus, WalletError, WalletResult, WalletSnapshot, WalletState};

/// 지갑 세션 매니저
///
/// 연결 / 해제 / 계정 변경 / 네트워크 변경을 추적하는 상태 머신입니다.
/// 상태는 `watch` 채널로 노출되며, 모든 전이는 이 타입을 통해서만 일어납니다.
#[derive(Clone)]
pub struct WalletSessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Option<Arc<dyn WalletProvider>>,
    config: WalletConfig,
    catalog: Arc<Catalog>,
    state: watch::Sender<WalletSnapshot>,
    /// 연결 사이클 세대. disconnect 또는 새 연결 시작 시 증가
    epoch: AtomicU64,
    /// 적용된 ChainChanged 이벤트 수. 연결 중 도착한 체인 변경을 보존하는 데 사용
    chain_epoch: AtomicU64,
    /// 이벤트 리스너 실행 여부. 동시에 하나만 허용
    listening: Arc<AtomicBool>,
}

impl WalletSessionManager {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, config: WalletConfig, catalog: Arc<Catalog>) -> Self {
        let initial = WalletSnapshot {
            provider_available: provider.is_some(),
            ..WalletSnapshot::default()
        };
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                catalog,
                state,
                epoch: AtomicU64::new(0),
                chain_epoch: AtomicU64::new(0),
                listening: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        self.inner.state.borrow().clone()
    }

    /// 상태 변경 구독
    pub fn subscribe(&self) -> watch::Receiver<WalletSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn is_provider_available(&self) -> bool {
        self.inner.provider.is_some()
    }

    /// 현재 주소 축약 표시. 연결되지 않았으면 빈 문자열
    pub fn short_address(&self) -> String {
        self.snapshot()
            .wallet
            .address
            .map(|address| short_address(&address.to_checksum(None)))
            .unwrap_or_default()
    }

    /// 지갑 연결 (승인 프롬프트 허용)
    pub async fn connect(&self) -> WalletResult<()> {
        let Some(provider) = self.inner.provider.clone() else {
            warn!("🚫 지갑 프로바이더 없음");
            self.set_error(&WalletError::ProviderNotFound);
            return Err(WalletError::ProviderNotFound);
        };

        self.run_connect_cycle(provider, true).await
    }

    /// 지갑 해제. 세션 필드를 모두 초기화
    pub fn disconnect(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_modify(|snapshot| {
            snapshot.wallet = WalletState::default();
            snapshot.is_loading = false;
        });
        info!("🔌 지갑 연결 해제");
    }

    /// 네트워크 전환 요청. 실패해도 세션 상태는 유지
    pub async fn switch_network(&self, chain_id: u64) -> WalletResult<()> {
        let Some(provider) = self.inner.provider.clone() else {
            self.set_error(&WalletError::ProviderNotFound);
            return Err(WalletError::ProviderNotFound);
        };

        self.inner.state.send_modify(|snapshot| snapshot.error = None);

        match provider.switch_chain(chain_id).await {
            Ok(()) => {
                info!("🌐 네트워크 전환 요청 완료: chain {}", chain_id);
                Ok(())
            }
            Err(e) => {
                let error = WalletError::SwitchNetwork(e);
                warn!("⚠️ {}", error);
                self.set_error(&error);
                Err(error)
            }
        }
    }

    pub async fn switch_to_mainnet(&self) -> WalletResult<()> {
        self.switch_network(self.inner.config.target_chain_id).await
    }

    /// 이미 승인된 계정이 있으면 프롬프트 없이 세션 복원
    ///
    /// 복원했으면 `true`.
    pub async fn restore_session(&self) -> WalletResult<bool> {
        let Some(provider) = self.inner.provider.clone() else {
            return Ok(false);
        };

        let accounts = match provider.authorized_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("⚠️ 지갑 연결 상태 확인 실패: {}", e);
                return Ok(false);
            }
        };

        if accounts.is_empty() {
            debug!("승인된 계정 없음, 세션 복원 생략");
            return Ok(false);
        }

        self.run_connect_cycle(provider, false).await?;
        Ok(self.snapshot().wallet.is_connected())
    }

    /// 프로바이더 푸시 이벤트 처리
    pub async fn handle_provider_event(&self, event: ProviderEvent) {
        debug!("📨 프로바이더 이벤트: {:?}", event);

        match event {
            ProviderEvent::AccountsChanged(accounts) if accounts.is_empty() => {
                self.disconnect();
            }
            ProviderEvent::AccountsChanged(_) => {
                let Some(provider) = self.inner.provider.clone() else {
                    return;
                };
                if let Err(e) = self.run_connect_cycle(provider, false).await {
                    warn!("⚠️ 계정 변경 후 재연결 실패: {}", e);
                }
            }
            ProviderEvent::ChainChanged(chain_id) => {
                let applied = self.inner.state.send_if_modified(|snapshot| {
                    if snapshot.wallet.status == ConnectionStatus::Disconnected {
                        return false;
                    }
                    self.inner.chain_epoch.fetch_add(1, Ordering::SeqCst);
                    snapshot.wallet.chain_id = Some(chain_id);
                    true
                });

                if applied {
                    info!("🌐 체인 변경: {}", chain_id);
                } else {
                    debug!("연결되지 않은 상태, 체인 변경 무시: {}", chain_id);
                }
            }
        }
    }

    /// 이벤트 구독 시작 및 기존 세션 복원
    ///
    /// 반환된 리스너를 stop 하거나 drop 하면 구독이 정확히 한 번 해제됩니다.
    /// 리스너가 이미 실행 중이면 비활성 리스너를 반환합니다.
    pub async fn start(&self) -> WalletListener {
        let Some(provider) = self.inner.provider.clone() else {
            debug!("지갑 프로바이더 없음, 이벤트 리스너 비활성");
            return WalletListener { registration: None };
        };

        if self.inner.listening.swap(true, Ordering::SeqCst) {
            warn!("⚠️ 지갑 이벤트 리스너가 이미 실행 중");
            return WalletListener { registration: None };
        }

        let (subscription, mut events) = provider.subscribe();
        let manager = self.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                manager.handle_provider_event(event).await;
            }
        });
        info!("📡 지갑 이벤트 리스너 시작 ({:?})", subscription);

        let listener = WalletListener {
            registration: Some(Registration {
                provider,
                subscription,
                task,
                listening: self.inner.listening.clone(),
            }),
        };

        if let Err(e) = self.restore_session().await {
            warn!("⚠️ 세션 복원 실패: {}", e);
        }

        listener
    }

    async fn run_connect_cycle(&self, provider: Arc<dyn WalletProvider>, prompt: bool) -> WalletResult<()> {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let chain_epoch = self.inner.chain_epoch.load(Ordering::SeqCst);

        self.inner.state.send_modify(|snapshot| {
            snapshot.wallet.status = ConnectionStatus::Connecting;
            snapshot.is_loading = true;
            snapshot.error = None;
        });

        let result = self.load_session(provider.as_ref(), prompt).await;

        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            debug!("🗑️ 연결 사이클 #{} 결과 폐기", epoch);
            return result.map(|_| ());
        }

        match result {
            Ok(wallet) => {
                info!(
                    "✅ 지갑 연결: {} (chain {:?}, 잔고 {:?})",
                    wallet.address.map(|a| a.to_checksum(None)).unwrap_or_default(),
                    wallet.chain_id,
                    wallet.balance
                );
                self.inner.state.send_modify(|snapshot| {
                    let latest_chain = snapshot.wallet.chain_id;
                    snapshot.wallet = wallet;
                    snapshot.is_loading = false;
                    // 조회 이후 도착한 ChainChanged 가 우선
                    if self.inner.chain_epoch.load(Ordering::SeqCst) != chain_epoch && latest_chain.is_some() {
                        snapshot.wallet.chain_id = latest_chain;
                    }
                });
                Ok(())
            }
            Err(e) => {
                warn!("❌ 지갑 연결 실패: {}", e);
                let message = e.to_string();
                self.inner.state.send_modify(|snapshot| {
                    snapshot.wallet = WalletState::default();
                    snapshot.is_loading = false;
                    snapshot.error = Some(message);
                });
                Err(e)
            }
        }
    }

    async fn load_session(&self, provider: &dyn WalletProvider, prompt: bool) -> WalletResult<WalletState> {
        let accounts = if prompt {
            provider.request_accounts().await
        } else {
            provider.authorized_accounts().await
        }
        .map_err(WalletError::Rejected)?;

        let address = accounts.first().copied().ok_or(WalletError::NoAccounts)?;
        let chain_id = provider.chain_id().await.map_err(WalletError::Rejected)?;
        let raw_balance = provider.get_balance(address).await.map_err(WalletError::Rejected)?;

        let decimals = self.inner.catalog.native_decimals(chain_id);
        let balance = format_units_fixed(raw_balance, decimals, self.inner.config.balance_precision)
            .ok_or_else(|| WalletError::InvalidBalance(raw_balance.to_string()))?;

        Ok(WalletState {
            status: ConnectionStatus::Connected,
            address: Some(address),
            chain_id: Some(chain_id),
            balance: Some(balance),
        })
    }

    fn set_error(&self, error: &WalletError) {
        let message = error.to_string();
        self.inner.state.send_modify(|snapshot| snapshot.error = Some(message));
    }
}

/// 프로바이더 이벤트 구독 핸들
pub struct WalletListener {
    registration: Option<Registration>,
}

struct Registration {
    provider: Arc<dyn WalletProvider>,
    subscription: SubscriptionId,
    task: JoinHandle<()>,
    listening: Arc<AtomicBool>,
}

impl WalletListener {
    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }

    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.provider.unsubscribe(registration.subscription);
            registration.task.abort();
            registration.listening.store(false, Ordering::SeqCst);
            info!("🛑 지갑 이벤트 리스너 중지 ({:?})", registration.subscription);
        }
    }
}

impl Drop for WalletListener {
    fn drop(&mut self) {
        self.release();
    }
}
