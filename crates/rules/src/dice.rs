use ludo_core::Roll;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Source of die rolls. A trait seam so game flows can be driven by
/// scripted rolls under test.
pub trait Dice: Send + Sync {
    /// Uniform draw in 1..=6.
    fn roll(&self) -> Roll;
}

/// Rolls from the thread-local CSPRNG, with rejection sampling on a byte
/// draw to eliminate modulo bias. 252 is the largest multiple of 6 below 256.
#[derive(Clone, Copy, Debug, Default)]
pub struct CryptoDice;

impl Dice for CryptoDice {
    fn roll(&self) -> Roll {
        loop {
            let byte: u8 = rand::rng().random();
            if byte < 252 {
                return byte % 6 + 1;
            }
        }
    }
}

/// Deterministic dice yielding scripted rolls in order, then ones.
pub struct ScriptedDice(Mutex<VecDeque<Roll>>);

impl ScriptedDice {
    pub fn new(rolls: &[Roll]) -> Self {
        Self(Mutex::new(rolls.iter().copied().collect()))
    }
}

impl Dice for ScriptedDice {
    fn roll(&self) -> Roll {
        self.0.lock().expect("dice script").pop_front().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn crypto_rolls_in_range() {
        let dice = CryptoDice;
        for _ in 0..10_000 {
            let r = dice.roll();
            assert!((1..=6).contains(&r));
        }
    }
    #[test]
    fn crypto_rolls_every_face() {
        let dice = CryptoDice;
        let mut seen = [false; 6];
        for _ in 0..10_000 {
            seen[dice.roll() as usize - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
    #[test]
    fn scripted_rolls_in_order() {
        let dice = ScriptedDice::new(&[6, 6, 3]);
        assert_eq!(dice.roll(), 6);
        assert_eq!(dice.roll(), 6);
        assert_eq!(dice.roll(), 3);
        assert_eq!(dice.roll(), 1);
    }
}
