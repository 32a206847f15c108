use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::constants::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuoteConfig {
    /// 시뮬레이션 지연 하한 (ms)
    pub latency_min_ms: u64,
    /// 시뮬레이션 지연 상한 (ms, 미포함)
    pub latency_max_ms: u64,
    pub gas_price_gwei: f64,
    pub native_price_usd: f64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: DEFAULT_LATENCY_MIN_MS,
            latency_max_ms: DEFAULT_LATENCY_MAX_MS,
            gas_price_gwei: DEFAULT_GAS_PRICE_GWEI,
            native_price_usd: DEFAULT_NATIVE_PRICE_USD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    /// switch_to_mainnet 대상 체인
    pub target_chain_id: u64,
    /// 잔고 표시 소수점 자릿수
    pub balance_precision: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            target_chain_id: MAINNET_CHAIN_ID,
            balance_precision: DEFAULT_BALANCE_PRECISION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub quote: QuoteConfig,
    pub wallet: WalletConfig,
    pub logging: LoggingConfig,
    pub catalog: Catalog,
}

impl Config {
    pub async fn load(path: &str) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path))?;

        Ok(config)
    }

    pub async fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.quote.latency_min_ms > self.quote.latency_max_ms {
            return Err(anyhow!(
                "quote.latency_min_ms ({}) must not exceed quote.latency_max_ms ({})",
                self.quote.latency_min_ms,
                self.quote.latency_max_ms
            ));
        }

        if !(self.quote.gas_price_gwei.is_finite() && self.quote.gas_price_gwei > 0.0) {
            return Err(anyhow!("quote.gas_price_gwei must be positive"));
        }

        if !(self.quote.native_price_usd.is_finite() && self.quote.native_price_usd > 0.0) {
            return Err(anyhow!("quote.native_price_usd must be positive"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(anyhow!("unknown log level {}", other)),
        }

        self.catalog.validate().context("invalid catalog")?;

        Ok(())
    }

    pub fn load_test_config() -> Self {
        let mut config = Self::default();
        config.quote.latency_min_ms = 0;
        config.quote.latency_max_ms = 0;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.quote.latency_min_ms, 1_000);
        assert_eq!(config.quote.latency_max_ms, 2_000);
        assert_eq!(config.quote.gas_price_gwei, 20.0);
        assert_eq!(config.quote.native_price_usd, 2400.0);
        assert_eq!(config.wallet.target_chain_id, 1);
        assert_eq!(config.wallet.balance_precision, 4);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.catalog.dexes.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.quote.latency_min_ms = 3_000;
        assert!(config.validate().is_err());

        config = Config::default();
        config.quote.gas_price_gwei = 0.0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.catalog.dexes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [quote]
            latency_min_ms = 10
            latency_max_ms = 20

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.quote.latency_min_ms, 10);
        assert_eq!(config.quote.gas_price_gwei, 20.0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.catalog, Catalog::default());
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregator.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::load_test_config();
        config.catalog.dexes[0].is_active = false;
        config.save(path).await.unwrap();

        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.catalog.dexes[0].is_active);
        assert_eq!(loaded.catalog.price_hint("sushiswap", "ETH/USDC"), Some(2400.80));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        assert!(Config::load("/nonexistent/aggregator.toml").await.is_err());
    }
}
