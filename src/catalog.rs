//! 토큰 / DEX / 가격 힌트 카탈로그
//!
//! 견적 엔진에 주입되는 정적 설정 데이터입니다. 로직은 조회와 검증뿐입니다.

use std::collections::{HashMap, HashSet};

use alloy::primitives::{address, Address};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::constants::NATIVE_DECIMALS;
use crate::types::{AggregatorError, AggregatorResult, Dex, Token};

/// 네이티브 통화 정보
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// 네트워크 정보
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub native_currency: NativeCurrency,
}

/// exchange id -> "FROM/TO" -> price
pub type PriceHints = HashMap<String, HashMap<String, f64>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub tokens: Vec<Token>,
    pub dexes: Vec<Dex>,
    #[serde(default)]
    pub price_hints: PriceHints,
    #[serde(default)]
    pub networks: Vec<NetworkInfo>,
}

static BUILTIN_CATALOG: Lazy<Catalog> = Lazy::new(Catalog::builtin);

impl Default for Catalog {
    fn default() -> Self {
        BUILTIN_CATALOG.clone()
    }
}

impl Catalog {
    pub fn new(tokens: Vec<Token>, dexes: Vec<Dex>) -> Self {
        Self {
            tokens,
            dexes,
            price_hints: HashMap::new(),
            networks: Vec::new(),
        }
    }

    pub fn with_price_hint(mut self, dex_id: &str, pair: &str, price: f64) -> Self {
        self.price_hints
            .entry(dex_id.to_string())
            .or_default()
            .insert(pair.to_string(), price);
        self
    }

    pub fn token(&self, symbol: &str) -> Option<&Token> {
        self.tokens.iter().find(|token| token.symbol == symbol)
    }

    pub fn token_by_address(&self, address: Address) -> Option<&Token> {
        self.tokens.iter().find(|token| token.address == address)
    }

    pub fn require_token(&self, symbol: &str) -> AggregatorResult<&Token> {
        self.token(symbol)
            .ok_or_else(|| AggregatorError::UnknownToken(symbol.to_string()))
    }

    pub fn dex(&self, id: &str) -> Option<&Dex> {
        self.dexes.iter().find(|dex| dex.id == id)
    }

    /// 카탈로그 순서를 유지한 활성 DEX 목록
    pub fn active_dexes(&self) -> impl Iterator<Item = &Dex> {
        self.dexes.iter().filter(|dex| dex.is_active)
    }

    /// 양수 유한 가격만 힌트로 인정
    pub fn price_hint(&self, dex_id: &str, pair: &str) -> Option<f64> {
        self.price_hints
            .get(dex_id)
            .and_then(|pairs| pairs.get(pair))
            .copied()
            .filter(|price| price.is_finite() && *price > 0.0)
    }

    pub fn network(&self, chain_id: u64) -> Option<&NetworkInfo> {
        self.networks.iter().find(|network| network.chain_id == chain_id)
    }

    /// 알 수 없는 체인은 18자리로 취급
    pub fn native_decimals(&self, chain_id: u64) -> u8 {
        self.network(chain_id)
            .map(|network| network.native_currency.decimals)
            .unwrap_or(NATIVE_DECIMALS)
    }

    pub fn validate(&self) -> AggregatorResult<()> {
        if self.tokens.is_empty() {
            return Err(AggregatorError::InvalidCatalog("token list is empty".to_string()));
        }
        if self.dexes.is_empty() {
            return Err(AggregatorError::InvalidCatalog("DEX list is empty".to_string()));
        }

        let mut symbols = HashSet::new();
        for token in &self.tokens {
            if !symbols.insert(token.symbol.as_str()) {
                return Err(AggregatorError::InvalidCatalog(format!(
                    "duplicate token symbol {}",
                    token.symbol
                )));
            }
            if !(token.price.is_finite() && token.price > 0.0) {
                return Err(AggregatorError::InvalidCatalog(format!(
                    "token {} has non-positive reference price {}",
                    token.symbol, token.price
                )));
            }
        }

        let mut ids = HashSet::new();
        for dex in &self.dexes {
            if !ids.insert(dex.id.as_str()) {
                return Err(AggregatorError::InvalidCatalog(format!("duplicate DEX id {}", dex.id)));
            }
            if !dex.fee.is_finite() || dex.fee < 0.0 {
                return Err(AggregatorError::InvalidCatalog(format!(
                    "DEX {} has invalid fee {}",
                    dex.id, dex.fee
                )));
            }
        }

        for (dex_id, pairs) in &self.price_hints {
            if !ids.contains(dex_id.as_str()) {
                return Err(AggregatorError::UnknownDex(dex_id.clone()));
            }
            for (pair, price) in pairs {
                if !(price.is_finite() && *price > 0.0) {
                    return Err(AggregatorError::InvalidCatalog(format!(
                        "price hint {} on {} must be positive",
                        pair, dex_id
                    )));
                }
            }
        }

        Ok(())
    }

    /// 메인넷 기본 카탈로그
    fn builtin() -> Self {
        let tokens = vec![
            token("ETH", "Ethereum", address!("0000000000000000000000000000000000000000"), 18, 2400.50),
            token("USDC", "USD Coin", address!("A0b86a33E6441e98F0dD36b99c33F89C05C73d8E"), 6, 1.00),
            token("USDT", "Tether", address!("dAC17F958D2ee523a2206206994597C13D831ec7"), 6, 1.00),
            token("WBTC", "Wrapped Bitcoin", address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"), 8, 43250.00),
            token("UNI", "Uniswap", address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984"), 18, 12.45),
            token("LINK", "Chainlink", address!("514910771AF9Ca656af840dff83E8264EcF986CA"), 18, 18.75),
            token("DAI", "Dai Stablecoin", address!("6B175474E89094C44Da98b954EedeAC495271d0F"), 18, 1.00),
            token("MATIC", "Polygon", address!("7D1AfA7B718fb893dB30A3aBc0Cfc608AaCfeBB0"), 18, 0.85),
        ];

        let dexes = vec![
            dex(
                "uniswap-v3",
                "Uniswap V3",
                0.3,
                address!("E592427A0AEce92De3Edee1F18E0157C05861564"),
                address!("1F98431c8aD98523631AE4a59f267346ea31F984"),
            ),
            dex(
                "uniswap-v2",
                "Uniswap V2",
                0.3,
                address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"),
                address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f"),
            ),
            dex(
                "sushiswap",
                "SushiSwap",
                0.25,
                address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F"),
                address!("C0AEe478e3658e2610c5F7A4A2E1777cE9e4f2Ac"),
            ),
            dex(
                "pancakeswap",
                "PancakeSwap",
                0.25,
                address!("EfF92A263d31888d860bD50809A8D171709b7b1c"),
                address!("1097053Fd2ea711dad45caCcc45EfF7548fCB362"),
            ),
            dex(
                "1inch",
                "1inch",
                0.2,
                address!("1111111254fb6c44bAC0beD2854e76F90643097d"),
                Address::ZERO,
            ),
            dex(
                "balancer",
                "Balancer",
                0.1,
                address!("BA12222222228d8Ba445958a75a0704d566BF2C8"),
                Address::ZERO,
            ),
        ];

        let hinted: [(&str, [f64; 3]); 4] = [
            ("uniswap-v3", [2401.25, 18.02, 0.00518]),
            ("sushiswap", [2400.80, 18.01, 0.00517]),
            ("pancakeswap", [2399.95, 18.00, 0.00516]),
            ("1inch", [2402.10, 18.03, 0.00519]),
        ];
        let mut price_hints = PriceHints::new();
        for (dex_id, [eth_usdc, wbtc_eth, uni_eth]) in hinted {
            price_hints.insert(
                dex_id.to_string(),
                HashMap::from([
                    ("ETH/USDC".to_string(), eth_usdc),
                    ("WBTC/ETH".to_string(), wbtc_eth),
                    ("UNI/ETH".to_string(), uni_eth),
                ]),
            );
        }

        let networks = vec![
            network(1, "Ethereum Mainnet", "https://mainnet.infura.io/v3/", "https://etherscan.io", "Ethereum", "ETH"),
            network(137, "Polygon", "https://polygon-rpc.com", "https://polygonscan.com", "MATIC", "MATIC"),
            network(56, "BSC", "https://bsc-dataseed.binance.org", "https://bscscan.com", "BNB", "BNB"),
        ];

        Self {
            tokens,
            dexes,
            price_hints,
            networks,
        }
    }
}

fn token(symbol: &str, name: &str, address: Address, decimals: u8, price: f64) -> Token {
    Token {
        symbol: symbol.to_string(),
        name: name.to_string(),
        address,
        decimals,
        price,
        chain_id: 1,
    }
}

fn dex(id: &str, name: &str, fee: f64, router_address: Address, factory_address: Address) -> Dex {
    Dex {
        id: id.to_string(),
        name: name.to_string(),
        fee,
        router_address,
        factory_address,
        is_active: true,
    }
}

fn network(chain_id: u64, name: &str, rpc_url: &str, explorer_url: &str, currency: &str, symbol: &str) -> NetworkInfo {
    NetworkInfo {
        chain_id,
        name: name.to_string(),
        rpc_url: rpc_url.to_string(),
        explorer_url: explorer_url.to_string(),
        native_currency: NativeCurrency {
            name: currency.to_string(),
            symbol: symbol.to_string(),
            decimals: NATIVE_DECIMALS,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::default();

        assert_eq!(catalog.tokens.len(), 8);
        assert_eq!(catalog.dexes.len(), 6);
        assert_eq!(catalog.active_dexes().count(), 6);
        assert_eq!(catalog.networks.len(), 3);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_token_lookups() {
        let catalog = Catalog::default();

        let usdc = catalog.token("USDC").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert!(catalog.token("usdc").is_none());

        let by_address = catalog
            .token_by_address("0xa0b86a33e6441e98f0dd36b99c33f89c05c73d8e".parse().unwrap())
            .unwrap();
        assert_eq!(by_address.symbol, "USDC");

        assert_eq!(
            catalog.require_token("DOGE"),
            Err(AggregatorError::UnknownToken("DOGE".to_string()))
        );
    }

    #[test]
    fn test_price_hints() {
        let catalog = Catalog::default();

        assert_eq!(catalog.price_hint("uniswap-v3", "ETH/USDC"), Some(2401.25));
        assert_eq!(catalog.price_hint("uniswap-v3", "USDC/ETH"), None);
        assert_eq!(catalog.price_hint("balancer", "ETH/USDC"), None);

        let zero_hint = Catalog::default().with_price_hint("balancer", "ETH/USDC", 0.0);
        assert_eq!(zero_hint.price_hint("balancer", "ETH/USDC"), None);
    }

    #[test]
    fn test_native_decimals_fallback() {
        let catalog = Catalog::default();
        assert_eq!(catalog.native_decimals(137), 18);
        assert_eq!(catalog.native_decimals(999_999), NATIVE_DECIMALS);
        assert_eq!(catalog.network(56).unwrap().native_currency.symbol, "BNB");
    }

    #[test]
    fn test_validate_rejects_bad_catalogs() {
        let mut duplicate = Catalog::default();
        duplicate.tokens.push(duplicate.tokens[0].clone());
        assert!(duplicate.validate().is_err());

        let mut zero_price = Catalog::default();
        zero_price.tokens[1].price = 0.0;
        assert!(zero_price.validate().is_err());

        let unknown_hint = Catalog::default().with_price_hint("curve", "ETH/USDC", 2400.0);
        assert_eq!(
            unknown_hint.validate(),
            Err(AggregatorError::UnknownDex("curve".to_string()))
        );

        let empty = Catalog::new(Vec::new(), Vec::new());
        assert!(empty.validate().is_err());
    }
}
