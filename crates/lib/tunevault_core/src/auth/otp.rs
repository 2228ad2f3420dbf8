//! One-time password codes for the recovery flow.

use rand::Rng;

/// OTP validity window in minutes.
pub const OTP_VALIDITY_MINUTES: i64 = 10;

/// Generate a 6-digit OTP code, uniform over [100000, 999999].
///
/// `rand::rng()` is a CSPRNG, so codes are not predictable from
/// previously observed ones.
pub fn generate_otp_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_code_is_six_digits() {
        for _ in 0..1000 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }
}
