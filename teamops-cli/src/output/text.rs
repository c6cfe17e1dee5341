//! Text output formatting with a validity bar and colors.

use chrono::{DateTime, Local, Utc};

use super::json::{CollaboratorsOutput, LoginOutput, TokenStatusOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats the cached token status.
    pub fn format_token_status(&self, status: &TokenStatusOutput) -> String {
        let mut lines = vec![self.bold("Pressable token"), "─".repeat(40)];

        match (status.issued_at, status.valid_until) {
            (Some(issued_at), Some(valid_until)) if status.cached => {
                let remaining = status.percent_remaining();
                let state = if status.valid {
                    self.color_for_percent(remaining, &format!("{remaining:.0}% left"))
                } else {
                    self.red("expired")
                };
                lines.push(format!("Status:   {} {}", self.progress_bar(remaining), state));
                lines.push(format!("Issued:   {}", self.format_local(issued_at)));
                lines.push(format!(
                    "Expires:  {}",
                    self.dim(&format_remaining(status.remaining_secs.unwrap_or(0), valid_until))
                ));
                lines.push(format!(
                    "Refresh:  {}",
                    if status.has_refresh_token {
                        self.green("available")
                    } else {
                        self.dim("none")
                    }
                ));
            }
            _ => lines.push(format!("Status:   {}", self.yellow("no cached token"))),
        }

        lines.push(format!("Cache:    {}", self.dim(&status.cache_path)));
        lines.join("\n")
    }

    /// Formats the SFTP users of a site.
    pub fn format_collaborators(&self, output: &CollaboratorsOutput<'_>) -> String {
        let mut lines = vec![
            self.bold(&format!("SFTP users of site {}", output.site_id)),
            "─".repeat(40),
        ];

        if output.users.is_empty() {
            lines.push(self.dim("No SFTP users"));
        }

        for user in &output.users {
            let username = user.username.unwrap_or("(pending)");
            let mut line = format!("{:<20} {}", username, user.email.unwrap_or("−"));
            if user.owner {
                line.push_str(&format!(" {}", self.dim("[owner]")));
            }
            if user.is_bot {
                line.push_str(&format!(" {}", self.cyan("[bot]")));
            }
            lines.push(line);
        }

        lines.join("\n")
    }

    /// Formats login data.
    pub fn format_login(&self, output: &LoginOutput<'_>) -> String {
        let login = &output.login.login;
        let mut lines = vec![
            self.bold(&format!("SFTP login for site {}", output.site_id)),
            "─".repeat(40),
        ];

        if let Some(host) = &login.host {
            lines.push(format!("Host:     {host}"));
        }
        lines.push(format!("Username: {}", self.cyan(&login.username)));
        lines.push(format!("Password: {}", login.password));

        let account = if output.login.used_fallback {
            format!("{} {}", output.login.email, self.yellow("(fallback)"))
        } else {
            output.login.email.clone()
        };
        lines.push(format!("Account:  {account}"));

        lines.join("\n")
    }

    /// Formats an error with its operator hint.
    pub fn format_error(&self, error: &str, hint: Option<&str>) -> String {
        let mut out = format!("{}: {error}", self.red("Error"));
        if let Some(hint) = hint {
            out.push('\n');
            out.push_str(&self.dim(hint));
        }
        out
    }

    /// Formats a progress bar.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let filled = ((percent_remaining / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    fn format_local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// "in 43 minutes", "in 1h 2m" or "expired at 14:05".
fn format_remaining(remaining_secs: i64, valid_until: DateTime<Utc>) -> String {
    if remaining_secs <= 0 {
        let local = valid_until.with_timezone(&Local);
        return format!("expired at {}", local.format("%H:%M"));
    }

    let mins = remaining_secs / 60;
    if mins < 60 {
        format!("in {} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else {
        format!("in {}h {}m", mins / 60, mins % 60)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_progress_bar_full() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(100.0), "██████████");
    }

    #[test]
    fn test_progress_bar_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(0.0), "░░░░░░░░░░");
    }

    #[test]
    fn test_color_for_percent() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.color_for_percent(15.0, "test").contains(RED));
        assert!(formatter.color_for_percent(35.0, "test").contains(YELLOW));
        assert!(formatter.color_for_percent(75.0, "test").contains(GREEN));
    }

    #[test]
    fn test_format_remaining() {
        let now = Utc::now();
        assert_eq!(format_remaining(60, now), "in 1 minute");
        assert_eq!(format_remaining(43 * 60 + 10, now), "in 43 minutes");
        assert_eq!(format_remaining(62 * 60, now), "in 1h 2m");
        assert!(format_remaining(0, now - Duration::minutes(1)).starts_with("expired at"));
    }

    #[test]
    fn test_format_error_with_hint() {
        let formatter = TextFormatter::new(false);
        let out = formatter.format_error("boom", Some("check things"));
        assert_eq!(out, "Error: boom\ncheck things");
    }
}
