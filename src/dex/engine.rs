use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use super::random::RandomSource;
use crate::catalog::Catalog;
use crate::constants::*;
use crate::types::{pair_key, AggregatorError, AggregatorResult, PriceComparison, Quote, Route, Token, TransactionCost};

/// 입력 수량 파싱. 유한한 양수만 허용
pub fn parse_amount(amount: &str) -> Option<f64> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Calculate price impact against a spot price, in percent
pub fn calculate_price_impact(input_amount: f64, output_amount: f64, spot_price: f64) -> f64 {
    let execution_price = input_amount / output_amount;
    ((execution_price - spot_price) / spot_price * 100.0).abs()
}

/// 활성 DEX별 시뮬레이션 라우트 계산
///
/// 유효하지 않은 수량이면 빈 목록을 반환합니다 (에러 아님).
/// 결과는 출력 수량 내림차순이며, 동률은 카탈로그 순서를 유지합니다.
pub fn compute_routes(
    from: &Token,
    to: &Token,
    amount: &str,
    catalog: &Catalog,
    rng: &mut dyn RandomSource,
) -> Vec<Route> {
    let Some(input_amount) = parse_amount(amount) else {
        debug!("⏭️ 유효하지 않은 입력 수량: {:?}", amount);
        return Vec::new();
    };

    let pair = pair_key(from, to);
    let synthetic_price = from.price / to.price;
    let mut routes = Vec::new();

    for dex in catalog.active_dexes() {
        let (base_price, spread) = match catalog.price_hint(&dex.id, &pair) {
            Some(hinted) => (hinted, HINTED_PRICE_SPREAD),
            None => (synthetic_price, SYNTHETIC_PRICE_SPREAD),
        };

        if !(base_price.is_finite() && base_price > 0.0) {
            warn!("⚠️ {} 기준 가격 계산 불가: {} = {}", dex.name, pair, base_price);
            continue;
        }

        // 1 ± spread
        let variation = 1.0 + spread * (2.0 * rng.next_f64() - 1.0);
        let output_amount = input_amount * base_price * variation;
        let price_impact = calculate_price_impact(input_amount, output_amount, base_price);

        let gas_estimate = GAS_ESTIMATE_MIN + (rng.next_f64() * GAS_ESTIMATE_SPAN as f64) as u64;
        let liquidity_musd = (rng.uniform(LIQUIDITY_MIN_MUSD, LIQUIDITY_SPAN_MUSD) * 10.0).floor() / 10.0;
        let slippage = rng.uniform(SLIPPAGE_MIN_PCT, SLIPPAGE_SPAN_PCT);

        routes.push(Route {
            dex: dex.clone(),
            input_token: from.clone(),
            output_token: to.clone(),
            input_amount,
            output_amount,
            price_impact,
            fee: dex.fee,
            gas_estimate,
            liquidity_pool: format!("${:.1}M", liquidity_musd),
            slippage,
        });
    }

    routes.sort_by(|a, b| b.output_amount.total_cmp(&a.output_amount));

    debug!("🔍 {} 라우트 {}개 계산 완료 (입력 {})", pair, routes.len(), input_amount);
    routes
}

/// 정렬된 라우트 목록으로 견적 요약 생성
pub fn synthesize_quote(routes: &[Route], rng: &mut dyn RandomSource) -> AggregatorResult<Quote> {
    let best_route = routes.first().ok_or(AggregatorError::NoRoutes)?.clone();

    let total_gas_cost: Decimal = routes
        .iter()
        .map(|route| Decimal::from(route.gas_estimate))
        .sum();

    let best_price = best_route.effective_price();
    let price_comparison = routes
        .iter()
        .map(|route| {
            let price = route.effective_price();
            PriceComparison {
                dex_id: route.dex.id.clone(),
                dex_name: route.dex.name.clone(),
                price,
                difference: (price - best_price) / best_price * 100.0,
            }
        })
        .collect();

    Ok(Quote {
        quote_id: Uuid::new_v4(),
        routes: routes.to_vec(),
        best_route,
        total_gas_cost,
        estimated_time: rng.uniform(CONFIRMATION_MIN_SECS, CONFIRMATION_SPAN_SECS),
        price_comparison,
        created_at: Utc::now(),
    })
}

/// 전체 평균 출력 대비 최적 라우트의 이득 (%)
///
/// 두 번째로 좋은 라우트와의 비교가 아닙니다.
pub fn calculate_savings(quote: &Quote) -> f64 {
    if quote.routes.len() < 2 {
        return 0.0;
    }

    let best_output = quote.best_route.output_amount;
    let average_output =
        quote.routes.iter().map(|route| route.output_amount).sum::<f64>() / quote.routes.len() as f64;

    (best_output - average_output) / average_output * 100.0
}

/// 가스비와 거래 수수료 분해 (USD)
pub fn transaction_cost_breakdown(route: &Route, native_price_usd: f64, gas_price_gwei: f64) -> TransactionCost {
    let gas_cost_native = route.gas_estimate as f64 * gas_price_gwei / GWEI_PER_NATIVE;
    let gas_cost_usd = gas_cost_native * native_price_usd;
    let trading_fee_usd = route.input_amount * route.input_token.price * (route.fee / 100.0);

    TransactionCost {
        gas_cost_usd,
        trading_fee_usd,
        total_usd: gas_cost_usd + trading_fee_usd,
    }
}

/// 20 gwei 고정 가스 가격 기준 총 트랜잭션 비용 (USD)
pub fn estimate_transaction_cost(route: &Route, native_price_usd: f64) -> f64 {
    transaction_cost_breakdown(route, native_price_usd, DEFAULT_GAS_PRICE_GWEI).total_usd
}
