use crate::dex::RandomSource;

/// 고정 값을 순환하며 반환하는 난수 소스
///
/// 값은 [0, 1) 범위로 잘립니다.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    position: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.0] } else { values };
        Self {
            values: values
                .into_iter()
                .map(|value| value.clamp(0.0, 1.0 - f64::EPSILON))
                .collect(),
            position: 0,
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_cycles() {
        let mut source = SequenceRandom::new(vec![0.1, 0.2]);
        assert_eq!(source.next_f64(), 0.1);
        assert_eq!(source.next_f64(), 0.2);
        assert_eq!(source.next_f64(), 0.1);
    }

    #[test]
    fn test_values_are_clamped() {
        let mut source = SequenceRandom::new(vec![1.5, -0.5]);
        assert!(source.next_f64() < 1.0);
        assert_eq!(source.next_f64(), 0.0);

        let mut empty = SequenceRandom::new(Vec::new());
        assert_eq!(empty.next_f64(), 0.0);
    }
}
