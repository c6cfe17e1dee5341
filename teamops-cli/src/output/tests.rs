//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes, and that tokens never leak into either.

#[cfg(test)]
mod token_status_tests {
    use super::super::json::{JsonFormatter, TokenStatusOutput};
    use super::super::text::TextFormatter;
    use chrono::{Duration, Utc};
    use std::path::Path;
    use teamops_core::CredentialToken;

    fn window() -> Duration {
        CredentialToken::default_validity_window()
    }

    #[test]
    fn test_fresh_token_status() {
        let now = Utc::now();
        let token = CredentialToken::new("secret-access", Some("secret-refresh".into()))
            .with_issued_at(now - Duration::minutes(10));

        let status = TokenStatusOutput::new(Some(&token), window(), now, Path::new("/tmp/t.json"));

        assert!(status.cached);
        assert!(status.valid);
        assert_eq!(status.age_secs, Some(600));
        assert_eq!(status.remaining_secs, Some(49 * 60));
        assert!(status.percent_remaining() > 80.0);
    }

    #[test]
    fn test_expired_token_status() {
        let now = Utc::now();
        let token = CredentialToken::new("a", None).with_issued_at(now - Duration::hours(1));

        let status = TokenStatusOutput::new(Some(&token), window(), now, Path::new("/tmp/t.json"));

        assert!(status.cached);
        assert!(!status.valid);
        assert_eq!(status.remaining_secs, Some(0));
        assert!(status.percent_remaining() < f64::EPSILON);

        let text = TextFormatter::new(false).format_token_status(&status);
        assert!(text.contains("expired"));
    }

    #[test]
    fn test_missing_token_status() {
        let status = TokenStatusOutput::new(None, window(), Utc::now(), Path::new("/tmp/t.json"));
        assert!(!status.cached);

        let text = TextFormatter::new(false).format_token_status(&status);
        assert!(text.contains("no cached token"));
        assert!(text.contains("/tmp/t.json"));
    }

    #[test]
    fn test_outputs_never_contain_tokens() {
        let now = Utc::now();
        let token = CredentialToken::new("secret-access", Some("secret-refresh".into()));
        let status = TokenStatusOutput::new(Some(&token), window(), now, Path::new("/tmp/t.json"));

        let json = JsonFormatter::new(true).format(&status).unwrap();
        let text = TextFormatter::new(false).format_token_status(&status);

        for out in [json, text] {
            assert!(!out.contains("secret-access"));
            assert!(!out.contains("secret-refresh"));
        }
    }

    #[test]
    fn test_json_field_names() {
        let status = TokenStatusOutput::new(None, window(), Utc::now(), Path::new("/tmp/t.json"));
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(false).format(&status).unwrap()).unwrap();

        assert_eq!(value["cached"], false);
        assert_eq!(value["validitySecs"], 59 * 60);
        assert!(value.get("issuedAt").is_none());
    }
}

#[cfg(test)]
mod collaborator_tests {
    use super::super::json::{CollaboratorsOutput, JsonFormatter, LoginOutput};
    use super::super::text::TextFormatter;
    use teamops_core::{LoginData, SftpUser};
    use teamops_providers::pressable::ResolvedLogin;

    fn users() -> Vec<SftpUser> {
        vec![
            SftpUser {
                id: Some(1),
                username: Some("owner".into()),
                email: Some("owner@example.com".into()),
                owner: Some(true),
            },
            SftpUser {
                id: Some(2),
                username: None,
                email: Some("BOTS@example.com".into()),
                owner: None,
            },
        ]
    }

    #[test]
    fn test_bot_is_flagged() {
        let users = users();
        let output = CollaboratorsOutput::new(42, &users, Some("bots@example.com"));

        assert!(!output.users[0].is_bot);
        assert!(output.users[1].is_bot);

        let text = TextFormatter::new(false).format_collaborators(&output);
        assert!(text.contains("site 42"));
        assert!(text.contains("[owner]"));
        assert!(text.contains("(pending)"));
        assert!(text.contains("[bot]"));
    }

    #[test]
    fn test_empty_listing() {
        let output = CollaboratorsOutput::new(42, &[], None);
        let text = TextFormatter::new(false).format_collaborators(&output);
        assert!(text.contains("No SFTP users"));
    }

    #[test]
    fn test_login_output() {
        let resolved = ResolvedLogin {
            login: LoginData::new("site-bot", "n3w").with_host(Some("sftp.pressable.com".into())),
            email: "concierge@example.com".into(),
            used_fallback: true,
        };
        let output = LoginOutput {
            site_id: 7,
            login: &resolved,
        };

        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(false).format(&output).unwrap()).unwrap();
        assert_eq!(value["siteId"], 7);
        assert_eq!(value["username"], "site-bot");
        assert_eq!(value["password"], "n3w");
        assert_eq!(value["host"], "sftp.pressable.com");
        assert_eq!(value["usedFallback"], true);

        let text = TextFormatter::new(false).format_login(&output);
        assert!(text.contains("Host:     sftp.pressable.com"));
        assert!(text.contains("(fallback)"));
    }
}
