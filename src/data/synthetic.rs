//! Deterministic synthetic passengers, used for the shipped sample artifacts
//! and as a training table in tests.

use super::model::RawRecord;

/// Weights in `FEATURE_COLUMNS` order that drive the survival draw.
pub const TRUE_COEFFICIENTS: [f64; 7] = [-0.95, 2.6, -0.035, -0.3, -0.1, 0.003, -0.15];
pub const TRUE_INTERCEPT: f64 = 1.9;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index of the first cumulative threshold above a uniform draw.
    fn pick(&mut self, cumulative: &[f64]) -> usize {
        let u = self.next_f64();
        cumulative.iter().position(|&c| u < c).unwrap_or(cumulative.len())
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let k = 10f64.powi(decimals);
    (v * k).round() / k
}

fn passenger(rng: &mut SimpleRng) -> RawRecord {
    let pclass = rng.pick(&[0.24, 0.45]) + 1;
    let sex = usize::from(rng.next_f64() < 0.36);
    let age = round_to(rng.gauss(30.0, 13.0).clamp(0.5, 76.0), 1);
    let sibsp = rng.pick(&[0.68, 0.9, 0.96, 0.99]);
    let parch = rng.pick(&[0.76, 0.9, 0.97]);
    let base_fare = [84.0, 21.0, 13.0][pclass - 1];
    let fare = round_to((base_fare * rng.gauss(0.0, 0.5).exp()).min(512.3292), 4);
    let embarked = rng.pick(&[0.24, 0.33]);

    let features = [
        pclass as f64,
        sex as f64,
        age,
        sibsp as f64,
        parch as f64,
        fare,
        embarked as f64,
    ];
    let z = TRUE_INTERCEPT
        + TRUE_COEFFICIENTS
            .iter()
            .zip(&features)
            .map(|(c, v)| c * v)
            .sum::<f64>();
    let p = 1.0 / (1.0 + (-z).exp());
    let survived = if rng.next_f64() < p { 1.0 } else { 0.0 };

    RawRecord {
        survived,
        pclass: features[0],
        sex: features[1],
        age,
        sibsp: features[3],
        parch: features[4],
        fare,
        embarked: features[6],
    }
}

/// `count` passengers drawn from a fixed seed. The same seed always yields
/// the same table.
pub fn passengers(count: usize, seed: u64) -> Vec<RawRecord> {
    let mut rng = SimpleRng::new(seed);
    (0..count).map(|_| passenger(&mut rng)).collect()
}
