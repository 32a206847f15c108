use std::path::Path;
use std::sync::Arc;

use alloy::primitives::{address, Address, U256};
use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dex_quote_aggregator::dex::{calculate_savings, RngSource};
use dex_quote_aggregator::mocks::MockWalletProvider;
use dex_quote_aggregator::{
    format_percentage, format_token_amount, format_usd, Config, QuoteSession, RandomSource, RequestOutcome,
    WalletProvider, WalletSessionManager,
};

const DEMO_ACCOUNT: Address = address!("742d35Cc6634C0532925a3b844Bc454e4438f44e");

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("aggregator")
        .version("0.1.0")
        .author("xCrack Team <team@xcrack.dev>")
        .about("🦀 멀티 DEX 스왑 견적 비교 시뮬레이터")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("설정 파일 경로")
                .default_value("config/default.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("로그 레벨 (trace, debug, info, warn, error)"),
        )
        .arg(Arg::new("from").long("from").value_name("SYMBOL").default_value("ETH"))
        .arg(Arg::new("to").long("to").value_name("SYMBOL").default_value("USDC"))
        .arg(Arg::new("amount").short('a').long("amount").value_name("AMOUNT").default_value("1.0"))
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("재현 가능한 시뮬레이션을 위한 난수 시드")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("no-latency")
                .long("no-latency")
                .help("시뮬레이션 지연 비활성화")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("견적을 JSON으로 출력")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("demo-wallet")
                .long("demo-wallet")
                .help("Mock 지갑 프로바이더로 지갑 연결 데모 실행")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config/default.toml");
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path).await?
    } else {
        Config::default()
    };

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }
    if matches.get_flag("no-latency") {
        config.quote.latency_min_ms = 0;
        config.quote.latency_max_ms = 0;
    }

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    if !Path::new(config_path).exists() {
        warn!("📋 설정 파일 없음 ({}), 기본 설정 사용", config_path);
    } else {
        info!("📋 설정 파일 로드 완료: {}", config_path);
    }
    config.validate()?;

    let catalog = Arc::new(config.catalog.clone());
    let rng: Box<dyn RandomSource> = match matches.get_one::<u64>("seed") {
        Some(seed) => Box::new(RngSource::seeded(*seed)),
        None => Box::new(RngSource::from_entropy()),
    };
    let session = QuoteSession::with_random_source(catalog.clone(), config.quote.clone(), rng);

    let from = matches.get_one::<String>("from").map(String::as_str).unwrap_or("ETH");
    let to = matches.get_one::<String>("to").map(String::as_str).unwrap_or("USDC");
    let amount = matches.get_one::<String>("amount").map(String::as_str).unwrap_or("1.0");

    match session.find_best_routes_by_symbol(from, to, amount).await? {
        RequestOutcome::Quoted(quote) if matches.get_flag("json") => {
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        RequestOutcome::Quoted(quote) => {
            println!("\n💱 {} {} -> {}", format_token_amount(amount), from, to);
            println!("{:<14} {:>18} {:>10} {:>8} {:>10} {:>10}", "DEX", "Output", "Diff", "Fee", "Gas", "Pool");
            for (route, comparison) in quote.routes.iter().zip(&quote.price_comparison) {
                println!(
                    "{:<14} {:>18} {:>10} {:>8} {:>10} {:>10}",
                    route.dex.name,
                    format_token_amount(&route.output_amount.to_string()),
                    format_percentage(comparison.difference),
                    format_percentage(route.fee),
                    route.gas_estimate,
                    route.liquidity_pool,
                );
            }

            let cost = session.estimate_transaction_cost(&quote.best_route);
            println!();
            println!("🏆 최적 라우트: {}", quote.best_route.dex.name);
            println!("💰 평균 대비 절감: {}", format_percentage(calculate_savings(&quote)));
            println!(
                "⛽ 예상 비용: {} (가스 {} + 수수료 {})",
                format_usd(cost.total_usd),
                format_usd(cost.gas_cost_usd),
                format_usd(cost.trading_fee_usd)
            );
            println!("⏱️ 예상 확인 시간: {:.0}초", quote.estimated_time);
            println!("🔢 전체 가스 추정량: {}", quote.total_gas_cost);
        }
        RequestOutcome::NoRoutes => {
            let error = session.snapshot().await.error.unwrap_or_default();
            return Err(anyhow!(error));
        }
        RequestOutcome::Superseded => {
            warn!("견적 요청이 다른 요청으로 대체됨");
        }
    }

    if matches.get_flag("demo-wallet") {
        run_wallet_demo(&config, catalog).await?;
    }

    Ok(())
}

async fn run_wallet_demo(config: &Config, catalog: Arc<dex_quote_aggregator::Catalog>) -> Result<()> {
    let provider: Arc<dyn WalletProvider> = Arc::new(
        MockWalletProvider::new(vec![DEMO_ACCOUNT], 137)
            .with_balance(DEMO_ACCOUNT, U256::from(3_141_500_000_000_000_000u128)),
    );
    let manager = WalletSessionManager::new(Some(provider), config.wallet.clone(), catalog.clone());

    let listener = manager.start().await;
    manager.connect().await?;
    manager.switch_to_mainnet().await?;

    let mut updates = manager.subscribe();
    let snapshot = updates
        .wait_for(|snapshot| snapshot.wallet.chain_id == Some(config.wallet.target_chain_id))
        .await?
        .clone();

    let network = snapshot
        .wallet
        .chain_id
        .and_then(|chain_id| catalog.network(chain_id))
        .map(|network| network.name.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    println!();
    println!("👛 지갑: {} ({})", manager.short_address(), network);
    println!("💎 잔고: {}", snapshot.wallet.balance.unwrap_or_default());

    manager.disconnect();
    listener.stop();
    Ok(())
}

fn print_banner() {
    println!(r#"
    ╔══════════════════════════════════════════════════════════════╗
    ║                                                              ║
    ║  🦀 DEX Quote Aggregator v0.1.0                             ║
    ║                                                              ║
    ║  여러 DEX의 스왑 견적을 시뮬레이션하고 비교합니다            ║
    ║                                                              ║
    ║  🎯 지원 DEX:                                                ║
    ║     • Uniswap V3 / V2, SushiSwap, PancakeSwap               ║
    ║     • 1inch, Balancer                                        ║
    ║                                                              ║
    ╚══════════════════════════════════════════════════════════════╝
    "#);
}
