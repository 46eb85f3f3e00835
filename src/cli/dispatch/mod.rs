use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
    };

    let jwt_secret = matches
        .get_one("jwt-secret")
        .map(|s: &String| SecretString::from(s.to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --jwt-secret"))?;

    let mut globals = GlobalArgs::new(jwt_secret);

    globals.admin_email = matches
        .get_one("admin-email")
        .map(|s: &String| s.to_string());

    globals.admin_password = matches
        .get_one("admin-password")
        .map(|s: &String| SecretString::from(s.to_string()));

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_server_action() {
        temp_env::with_vars(
            [
                ("PORTAL_ADMIN_EMAIL", None::<String>),
                ("PORTAL_ADMIN_PASSWORD", None::<String>),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "portal",
                    "--port",
                    "9090",
                    "--dsn",
                    "postgres://localhost:5432/portal",
                    "--jwt-secret",
                    "sekret",
                ]);

                let (action, globals) = handler(&matches).unwrap();

                match action {
                    Action::Server { port, dsn } => {
                        assert_eq!(port, 9090);
                        assert_eq!(dsn, "postgres://localhost:5432/portal");
                    }
                }

                assert_eq!(globals.jwt_secret.expose_secret(), "sekret");
                assert!(globals.admin_email.is_none());
            },
        );
    }

    #[test]
    fn test_handler_seed_admin() {
        let matches = commands::new().get_matches_from(vec![
            "portal",
            "--dsn",
            "postgres://localhost:5432/portal",
            "--jwt-secret",
            "sekret",
            "--admin-email",
            "root@example.com",
            "--admin-password",
            "changeme",
        ]);

        let (_, globals) = handler(&matches).unwrap();

        assert_eq!(globals.admin_email.as_deref(), Some("root@example.com"));
        assert_eq!(
            globals
                .admin_password
                .as_ref()
                .map(|p| p.expose_secret().to_string()),
            Some("changeme".to_string())
        );
    }
}
