/// Avatar idle randomisation, so a crowd of identical rigs doesn't breathe
/// in lockstep.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Animation state the randomised start applies to.
    pub state: String,
    /// Playback speed range as `(min, max)`.
    pub speed_range: (f32, f32),
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            state: "Idle".to_string(),
            speed_range: (0.95, 1.05),
        }
    }
}

/// Where and how fast an idle loop starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdleStart {
    /// Normalised start time in `[0, 1)`.
    pub normalized_time: f32,
    pub speed: f32,
}

/// Pick a random start phase and a speed from `speed_range`. A reversed or
/// empty range yields its lower bound.
pub fn randomize_idle<R: Rng + ?Sized>(rng: &mut R, speed_range: (f32, f32)) -> IdleStart {
    let (min, max) = speed_range;
    let speed = if max > min { rng.gen_range(min..max) } else { min };
    IdleStart {
        normalized_time: rng.gen::<f32>(),
        speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let start = randomize_idle(&mut rng, (0.95, 1.05));
            assert!((0.0..1.0).contains(&start.normalized_time));
            assert!((0.95..1.05).contains(&start.speed));
        }
    }

    #[test]
    fn same_seed_same_start() {
        let a = randomize_idle(&mut StdRng::seed_from_u64(9), (0.5, 2.0));
        let b = randomize_idle(&mut StdRng::seed_from_u64(9), (0.5, 2.0));
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_range_uses_lower_bound() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(randomize_idle(&mut rng, (1.2, 1.2)).speed, 1.2);
        assert_eq!(randomize_idle(&mut rng, (2.0, 1.0)).speed, 2.0);
    }
}
