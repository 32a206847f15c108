use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use super::engine::{calculate_savings, compute_routes, synthesize_quote, transaction_cost_breakdown};
use super::random::{RandomSource, RngSource};
use crate::catalog::Catalog;
use crate::config::QuoteConfig;
use crate::types::{pair_key, AggregatorResult, Quote, Route, Token, TransactionCost};

/// 호출자가 소유하는 견적 요청 상태
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteState {
    pub routes: Vec<Route>,
    pub best_quote: Option<Quote>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// 견적 요청 결과
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// 견적이 커밋됨
    Quoted(Quote),
    /// 라우트가 없어 에러가 커밋됨
    NoRoutes,
    /// 더 최근 요청(또는 reset)이 있어 결과를 버림
    Superseded,
}

/// 견적 세션
///
/// 요청마다 단조 증가하는 번호를 부여하고, 완료 시점에 최신 번호가 아니면
/// 결과를 커밋하지 않습니다. 로딩 플래그는 최신 요청만 해제합니다.
pub struct QuoteSession {
    catalog: Arc<Catalog>,
    config: QuoteConfig,
    rng: Mutex<Box<dyn RandomSource>>,
    state: RwLock<QuoteState>,
    latest_request: AtomicU64,
}

impl QuoteSession {
    pub fn new(catalog: Arc<Catalog>, config: QuoteConfig) -> Self {
        Self::with_random_source(catalog, config, Box::new(RngSource::from_entropy()))
    }

    pub fn with_random_source(catalog: Arc<Catalog>, config: QuoteConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            catalog,
            config,
            rng: Mutex::new(rng),
            state: RwLock::new(QuoteState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// 현재 상태 스냅샷
    pub async fn snapshot(&self) -> QuoteState {
        self.state.read().await.clone()
    }

    /// 모든 DEX에서 최적 라우트 탐색
    pub async fn find_best_routes(&self, from: &Token, to: &Token, amount: &str) -> RequestOutcome {
        let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let pair = pair_key(from, to);

        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        info!("🔄 견적 요청 #{} 시작: {} {}", request_id, amount, pair);

        let delay = {
            let mut rng = self.rng.lock().await;
            self.simulated_latency(&mut **rng)
        };
        sleep(delay).await;

        let (routes, quote) = {
            let mut rng = self.rng.lock().await;
            let routes = compute_routes(from, to, amount, &self.catalog, &mut **rng);
            let quote = synthesize_quote(&routes, &mut **rng);
            (routes, quote)
        };

        let mut state = self.state.write().await;
        if self.latest_request.load(Ordering::SeqCst) != request_id {
            debug!("🗑️ 견적 요청 #{} 결과 폐기 (최신 요청 아님)", request_id);
            return RequestOutcome::Superseded;
        }

        state.routes = routes;
        state.is_loading = false;

        match quote {
            Ok(quote) => {
                info!(
                    "✅ 견적 요청 #{} 완료: 최적 {} -> {:.6} {} ({}개 라우트)",
                    request_id,
                    quote.best_route.dex.name,
                    quote.best_route.output_amount,
                    to.symbol,
                    quote.routes.len()
                );
                state.best_quote = Some(quote.clone());
                RequestOutcome::Quoted(quote)
            }
            Err(e) => {
                warn!("⚠️ 견적 요청 #{} 실패: {}", request_id, e);
                state.best_quote = None;
                state.error = Some(e.to_string());
                RequestOutcome::NoRoutes
            }
        }
    }

    /// 카탈로그 심볼로 토큰을 찾아 견적 요청
    pub async fn find_best_routes_by_symbol(
        &self,
        from_symbol: &str,
        to_symbol: &str,
        amount: &str,
    ) -> AggregatorResult<RequestOutcome> {
        let from = self.catalog.require_token(from_symbol)?.clone();
        let to = self.catalog.require_token(to_symbol)?.clone();
        Ok(self.find_best_routes(&from, &to, amount).await)
    }

    /// 파생 상태 전체 초기화. 진행 중인 요청의 결과도 버려집니다.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        *state = QuoteState::default();
        debug!("🧹 견적 세션 초기화");
    }

    pub fn calculate_savings(&self, quote: &Quote) -> f64 {
        calculate_savings(quote)
    }

    /// 설정된 가스 가격과 네이티브 통화 가격 기준 비용
    pub fn estimate_transaction_cost(&self, route: &Route) -> TransactionCost {
        transaction_cost_breakdown(route, self.config.native_price_usd, self.config.gas_price_gwei)
    }

    fn simulated_latency(&self, rng: &mut dyn RandomSource) -> Duration {
        let span = self.config.latency_max_ms.saturating_sub(self.config.latency_min_ms);
        let jitter = (rng.next_f64() * span as f64) as u64;
        Duration::from_millis(self.config.latency_min_ms + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::SequenceRandom;
    use crate::types::AggregatorError;

    fn session(latency_ms: u64) -> QuoteSession {
        let config = QuoteConfig {
            latency_min_ms: latency_ms,
            latency_max_ms: latency_ms,
            ..QuoteConfig::default()
        };
        QuoteSession::with_random_source(
            Arc::new(Catalog::default()),
            config,
            Box::new(SequenceRandom::constant(0.5)),
        )
    }

    fn tokens(session: &QuoteSession, from: &str, to: &str) -> (Token, Token) {
        (
            session.catalog().token(from).unwrap().clone(),
            session.catalog().token(to).unwrap().clone(),
        )
    }

    #[tokio::test]
    async fn test_find_best_routes_commits_quote() {
        let session = session(0);
        let (eth, usdc) = tokens(&session, "ETH", "USDC");

        let outcome = session.find_best_routes(&eth, &usdc, "1.0").await;

        let RequestOutcome::Quoted(quote) = outcome else {
            panic!("expected a quote");
        };
        let state = session.snapshot().await;
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(state.routes.len(), 6);
        assert_eq!(state.routes, quote.routes);
        assert_eq!(state.best_quote.as_ref(), Some(&quote));
        assert_eq!(quote.best_route, state.routes[0]);
        // 1inch 힌트가 가장 높음
        assert_eq!(quote.best_route.dex.id, "1inch");
    }

    #[tokio::test]
    async fn test_zero_amount_sets_error() {
        let session = session(0);
        let (eth, usdc) = tokens(&session, "ETH", "USDC");

        let outcome = session.find_best_routes(&eth, &usdc, "0").await;

        assert_eq!(outcome, RequestOutcome::NoRoutes);
        let state = session.snapshot().await;
        assert!(state.routes.is_empty());
        assert!(state.best_quote.is_none());
        assert!(!state.is_loading);
        assert_eq!(state.error, Some(AggregatorError::NoRoutes.to_string()));
    }

    #[tokio::test]
    async fn test_next_request_clears_previous_error() {
        let session = session(0);
        let (eth, usdc) = tokens(&session, "ETH", "USDC");

        session.find_best_routes(&eth, &usdc, "abc").await;
        assert!(session.snapshot().await.error.is_some());

        session.find_best_routes(&eth, &usdc, "2").await;
        let state = session.snapshot().await;
        assert!(state.error.is_none());
        assert!(state.best_quote.is_some());
    }

    #[tokio::test]
    async fn test_overlapping_requests_keep_latest() {
        let session = session(50);
        let (eth, usdc) = tokens(&session, "ETH", "USDC");
        let (wbtc, eth_out) = tokens(&session, "WBTC", "ETH");

        let (first, second) = tokio::join!(
            session.find_best_routes(&eth, &usdc, "1"),
            session.find_best_routes(&wbtc, &eth_out, "1"),
        );

        assert_eq!(first, RequestOutcome::Superseded);
        assert!(matches!(second, RequestOutcome::Quoted(_)));

        let state = session.snapshot().await;
        assert!(!state.is_loading);
        let best = state.best_quote.unwrap();
        assert_eq!(best.best_route.input_token.symbol, "WBTC");
        assert!(state.routes.iter().all(|route| route.output_token.symbol == "ETH"));
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_request() {
        let session = session(50);
        let (eth, usdc) = tokens(&session, "ETH", "USDC");

        let (outcome, _) = tokio::join!(session.find_best_routes(&eth, &usdc, "1"), async {
            session.reset().await;
        });

        assert_eq!(outcome, RequestOutcome::Superseded);
        assert_eq!(session.snapshot().await, QuoteState::default());
    }

    #[tokio::test]
    async fn test_find_by_symbol() {
        let session = session(0);

        let outcome = session.find_best_routes_by_symbol("UNI", "ETH", "10").await.unwrap();
        assert!(matches!(outcome, RequestOutcome::Quoted(_)));

        let unknown = session.find_best_routes_by_symbol("DOGE", "ETH", "10").await;
        assert_eq!(unknown, Err(AggregatorError::UnknownToken("DOGE".to_string())));
    }

    #[test]
    fn test_default_latency_range() {
        let session = QuoteSession::with_random_source(
            Arc::new(Catalog::default()),
            QuoteConfig::default(),
            Box::new(SequenceRandom::constant(0.5)),
        );

        let shortest = session.simulated_latency(&mut SequenceRandom::constant(0.0));
        assert_eq!(shortest, Duration::from_millis(1000));

        let midpoint = session.simulated_latency(&mut SequenceRandom::constant(0.5));
        assert_eq!(midpoint, Duration::from_millis(1500));

        let longest = session.simulated_latency(&mut SequenceRandom::constant(0.999_999));
        assert!(longest >= Duration::from_millis(1999));
        assert!(longest < Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_request_waits_for_simulated_latency() {
        let config = QuoteConfig {
            latency_min_ms: 20,
            latency_max_ms: 60,
            ..QuoteConfig::default()
        };
        let session = QuoteSession::with_random_source(
            Arc::new(Catalog::default()),
            config,
            Box::new(SequenceRandom::constant(0.5)),
        );
        let (eth, usdc) = tokens(&session, "ETH", "USDC");

        let started = std::time::Instant::now();
        let outcome = session.find_best_routes(&eth, &usdc, "1").await;

        // 20 + 0.5 * 40 = 40ms
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert!(matches!(outcome, RequestOutcome::Quoted(_)));
    }

    #[tokio::test]
    async fn test_cost_uses_session_config() {
        let session = session(0);
        let (eth, usdc) = tokens(&session, "ETH", "USDC");

        let RequestOutcome::Quoted(quote) = session.find_best_routes(&eth, &usdc, "1").await else {
            panic!("expected a quote");
        };
        let cost = session.estimate_transaction_cost(&quote.best_route);

        // 가스 46_000 * 20 gwei * 2400 USD
        assert!((cost.gas_cost_usd - 2.208).abs() < 1e-9);
        assert!(cost.total_usd > cost.gas_cost_usd);
        assert!(session.calculate_savings(&quote) > 0.0);
    }
}
