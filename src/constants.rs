// Reference chain
pub const MAINNET_CHAIN_ID: u64 = 1;
pub const NATIVE_DECIMALS: u8 = 18;

// Gas assumptions (fixed, not read from any oracle)
pub const DEFAULT_GAS_PRICE_GWEI: f64 = 20.0;
pub const GWEI_PER_NATIVE: f64 = 1e9;
pub const DEFAULT_NATIVE_PRICE_USD: f64 = 2400.0;

// Price variation around the base price (fraction, applied as ±)
pub const SYNTHETIC_PRICE_SPREAD: f64 = 0.05; // ±5%
pub const HINTED_PRICE_SPREAD: f64 = 0.005; // ±0.5%

// Gas estimate range in gas units: [MIN, MIN + SPAN)
pub const GAS_ESTIMATE_MIN: u64 = 21_000;
pub const GAS_ESTIMATE_SPAN: u64 = 50_000;

// Liquidity pool label range in millions of USD: [MIN, MIN + SPAN)
pub const LIQUIDITY_MIN_MUSD: f64 = 5.0;
pub const LIQUIDITY_SPAN_MUSD: f64 = 20.0;

// Slippage estimate range in percent: [MIN, MIN + SPAN)
pub const SLIPPAGE_MIN_PCT: f64 = 0.5;
pub const SLIPPAGE_SPAN_PCT: f64 = 2.0;

// Estimated confirmation time in seconds: [MIN, MIN + SPAN)
pub const CONFIRMATION_MIN_SECS: f64 = 15.0;
pub const CONFIRMATION_SPAN_SECS: f64 = 30.0;

// Simulated quote latency in milliseconds
pub const DEFAULT_LATENCY_MIN_MS: u64 = 1_000;
pub const DEFAULT_LATENCY_MAX_MS: u64 = 2_000;

// Wallet display
pub const DEFAULT_BALANCE_PRECISION: usize = 4;

// User-facing messages
pub const NO_PROVIDER_MESSAGE: &str =
    "No wallet provider found. Please install MetaMask or another browser wallet to continue.";
pub const NO_ROUTES_MESSAGE: &str = "No routes found for this token pair";
