use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 견적 시뮬레이션에 쓰이는 균등 난수 소스
///
/// 가격 변동, 가스 추정, 유동성 라벨, 슬리피지, 지연 시간이 모두 이 소스에서 나옵니다.
/// 테스트에서는 고정 값 소스를 주입해 출력을 고정할 수 있습니다.
pub trait RandomSource: Send {
    /// [0, 1) 범위의 균등 난수
    fn next_f64(&mut self) -> f64;

    /// [low, low + span) 범위의 균등 난수
    fn uniform(&mut self, low: f64, span: f64) -> f64 {
        low + self.next_f64() * span
    }
}

/// `rand` 생성기를 감싼 프로덕션 난수 소스
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// 재현 가능한 시드 기반 소스
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
