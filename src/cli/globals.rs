use secrecy::SecretString;

/// Process-wide configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub admin_email: Option<String>,
    pub admin_password: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            admin_email: None,
            admin_password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("top-secret".to_string()));
        assert_eq!(args.jwt_secret.expose_secret(), "top-secret");
        assert!(args.admin_email.is_none());
        assert!(args.admin_password.is_none());
    }
}
