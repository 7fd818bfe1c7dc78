/// Round to 2 decimal places, the precision all price fields are served at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_truncates_to_cents() {
        assert_eq!(round2(245.678), 245.68);
        assert_eq!(round2(245.0), 245.0);
        assert_eq!(round2(244.9949), 244.99);
        assert_eq!(round2(-0.125), -0.13);
    }
}
