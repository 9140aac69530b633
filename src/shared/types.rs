//! Common types used across the application

use solana_sdk::pubkey::Pubkey;

/// Cache/tracker key for an ordered token pair
pub fn pair_key(input: &Pubkey, output: &Pubkey) -> String {
    format!("{}-{}", input, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_ordered() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert_ne!(pair_key(&a, &b), pair_key(&b, &a));
    }
}
