use rand::Rng;

pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(100000..999999))
}

// Owner records created during reconciliation get a throwaway password
// nobody knows until a real one is set through a reset flow.
pub fn generate_placeholder_password() -> String {
    use rand::distr::Alphanumeric;

    let mut rng = rand::rng();
    (0..16).map(|_| rng.sample(Alphanumeric) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_numeric_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn placeholder_password_is_alphanumeric() {
        let password = generate_placeholder_password();
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_placeholder_passwords_differ() {
        assert_ne!(
            generate_placeholder_password(),
            generate_placeholder_password()
        );
    }
}
