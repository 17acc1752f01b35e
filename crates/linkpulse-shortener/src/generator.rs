use linkpulse_core::alias::ALIAS_ALPHABET;
use linkpulse_core::Alias;

/// Trait for producing candidate aliases.
///
/// Implementations are pure generators that don't interact with storage;
/// the service claims each candidate atomically and asks for another on a
/// collision.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> Alias;
}

/// Draws aliases uniformly from the 64-symbol URL-safe alphabet.
///
/// At the default length of 8 that is 2^48 possible aliases.
#[derive(Debug, Clone, Copy)]
pub struct RandomAliasGenerator {
    length: usize,
}

impl RandomAliasGenerator {
    pub const DEFAULT_LENGTH: usize = 8;

    /// `length` is clamped into the accepted alias length range.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(Alias::MIN_LEN, Alias::MAX_LEN),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomAliasGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

impl Generator for RandomAliasGenerator {
    fn generate(&self) -> Alias {
        let alias: String = std::iter::repeat_with(|| {
            ALIAS_ALPHABET[rand::random_range(0..ALIAS_ALPHABET.len())] as char
        })
        .take(self.length)
        .collect();
        Alias::new_unchecked(alias)
    }
}
