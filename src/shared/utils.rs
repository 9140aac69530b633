//! Utility functions and helpers

/// Profit (or spread) of `output` over `input`, in basis points
pub fn profit_bps(input: f64, output: f64) -> f64 {
    if input == 0.0 {
        return 0.0;
    }
    (output - input) / input * 10_000.0
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Split `items` into consecutive chunks of at most `size` elements,
/// preserving order. `size` of zero is treated as one.
pub fn chunked<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut current = Vec::with_capacity(size);
    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profit_bps() {
        assert_eq!(profit_bps(100.0, 101.0), 100.0);
        assert_eq!(profit_bps(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_chunked_sizes() {
        // 5 items with a cap of 2 yield groups of [2, 2, 1] in order
        let chunks = chunked(vec![1, 2, 3, 4, 5], 2);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(chunks[0], vec![1, 2]);
        assert_eq!(chunks[2], vec![5]);
    }

    #[test]
    fn test_chunked_zero_size() {
        let chunks = chunked(vec![1, 2], 0);
        assert_eq!(chunks.len(), 2);
    }
}
