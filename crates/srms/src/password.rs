//! Advisory password strength feedback for the change-password form.
//!
//! Not a security boundary; storage and hashing belong to the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_LENGTH: usize = 8;
const EMPTY_PASSWORD: &str = "Enter a new password.";
const MIN_EMAIL_FRAGMENT: usize = 3;

const COMMON_PASSWORDS: [&str; 7] = [
    "password", "123456", "qwerty", "admin", "teacher", "student", "welcome",
];
const DIGIT_RUNS: [&str; 7] = ["0123", "1234", "2345", "3456", "4567", "5678", "6789"];
const KEYBOARD_RUNS: [&str; 12] = [
    "abcd", "bcde", "cdef", "defg", "efgh", "fghi", "ghij", "hijk", "ijkl", "qwer", "asdf", "zxcv",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLabel {
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrengthLabel::Weak => "Weak",
            StrengthLabel::Medium => "Medium",
            StrengthLabel::Strong => "Strong",
        };
        f.write_str(label)
    }
}

/// Rules in the order their issues are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRule {
    MinimumLength,
    NoWhitespace,
    Lowercase,
    Uppercase,
    Digit,
    Special,
    NotCommon,
    NoEmailFragment,
    NoRepeats,
    NoDigitRun,
    NoKeyboardRun,
}

impl PasswordRule {
    pub fn issue(&self) -> &'static str {
        match self {
            PasswordRule::MinimumLength => "Use at least 8 characters.",
            PasswordRule::NoWhitespace => "Do not use spaces.",
            PasswordRule::Lowercase => "Add at least one lowercase letter.",
            PasswordRule::Uppercase => "Add at least one uppercase letter.",
            PasswordRule::Digit => "Add at least one number.",
            PasswordRule::Special => "Add at least one special character.",
            PasswordRule::NotCommon => "Avoid common passwords.",
            PasswordRule::NoEmailFragment => {
                "Do not include your email/username in the password."
            }
            PasswordRule::NoRepeats => "Avoid repeated characters (e.g., aaa).",
            PasswordRule::NoDigitRun => "Avoid simple number sequences (e.g., 1234).",
            PasswordRule::NoKeyboardRun => "Avoid common keyboard/sequential patterns.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordStrength {
    pub label: StrengthLabel,
    /// Empty exactly when the label is `Strong`.
    pub issues: Vec<String>,
}

impl PasswordStrength {
    pub fn is_strong(&self) -> bool {
        self.label == StrengthLabel::Strong
    }

    /// First issue, or a generic prompt, for single-line form errors.
    pub fn headline(&self) -> Option<&str> {
        match self.label {
            StrengthLabel::Strong => None,
            _ => Some(
                self.issues
                    .first()
                    .map(String::as_str)
                    .unwrap_or("Please choose a stronger password."),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordStrengthEvaluator;

impl PasswordStrengthEvaluator {
    pub fn evaluate(&self, password: &str, associated_email: &str) -> PasswordStrength {
        let password = password.trim_end();
        if password.is_empty() {
            return PasswordStrength {
                label: StrengthLabel::Weak,
                issues: vec![EMPTY_PASSWORD.to_string()],
            };
        }

        let traits = Traits::of(password);
        let lowered = password.to_lowercase();
        let violated = |rule: PasswordRule| match rule {
            PasswordRule::MinimumLength => traits.length < MIN_LENGTH,
            PasswordRule::NoWhitespace => traits.whitespace,
            PasswordRule::Lowercase => !traits.lowercase,
            PasswordRule::Uppercase => !traits.uppercase,
            PasswordRule::Digit => !traits.digit,
            PasswordRule::Special => !traits.special,
            PasswordRule::NotCommon => is_common(&lowered),
            PasswordRule::NoEmailFragment => contains_email_fragment(&lowered, associated_email),
            PasswordRule::NoRepeats => has_triple(password),
            PasswordRule::NoDigitRun => DIGIT_RUNS.iter().any(|run| password.contains(run)),
            PasswordRule::NoKeyboardRun => KEYBOARD_RUNS.iter().any(|run| lowered.contains(run)),
        };

        let issues: Vec<String> = ALL_RULES
            .iter()
            .copied()
            .filter(|rule| violated(*rule))
            .map(|rule| rule.issue().to_string())
            .collect();

        let core_strong = traits.length >= MIN_LENGTH
            && !traits.whitespace
            && traits.classes() == 4
            && !is_common(&lowered);

        let label = if core_strong && issues.is_empty() {
            StrengthLabel::Strong
        } else if traits.length >= MIN_LENGTH && traits.classes() >= 3 {
            StrengthLabel::Medium
        } else {
            StrengthLabel::Weak
        };

        PasswordStrength { label, issues }
    }
}

pub fn evaluate(password: &str, associated_email: &str) -> PasswordStrength {
    PasswordStrengthEvaluator.evaluate(password, associated_email)
}

const ALL_RULES: [PasswordRule; 11] = [
    PasswordRule::MinimumLength,
    PasswordRule::NoWhitespace,
    PasswordRule::Lowercase,
    PasswordRule::Uppercase,
    PasswordRule::Digit,
    PasswordRule::Special,
    PasswordRule::NotCommon,
    PasswordRule::NoEmailFragment,
    PasswordRule::NoRepeats,
    PasswordRule::NoDigitRun,
    PasswordRule::NoKeyboardRun,
];

struct Traits {
    length: usize,
    whitespace: bool,
    lowercase: bool,
    uppercase: bool,
    digit: bool,
    special: bool,
}

impl Traits {
    fn of(password: &str) -> Self {
        Self {
            length: password.chars().count(),
            whitespace: password.chars().any(char::is_whitespace),
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    fn classes(&self) -> usize {
        [self.lowercase, self.uppercase, self.digit, self.special]
            .into_iter()
            .filter(|present| *present)
            .count()
    }
}

fn is_common(lowered: &str) -> bool {
    COMMON_PASSWORDS.contains(&lowered)
}

fn contains_email_fragment(lowered: &str, email: &str) -> bool {
    let local = email
        .split('@')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    local.chars().count() >= MIN_EMAIL_FRAGMENT && lowered.contains(&local)
}

fn has_triple(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars
        .windows(3)
        .any(|window| window[0] == window[1] && window[1] == window[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_has_a_single_prompt() {
        let result = evaluate("", "x@y.com");
        assert_eq!(result.label, StrengthLabel::Weak);
        assert_eq!(result.issues, vec!["Enter a new password.".to_string()]);

        assert_eq!(evaluate("   ", "x@y.com").issues, result.issues);
    }

    #[test]
    fn well_formed_password_is_strong() {
        let result = evaluate("Tr0ub4dor&3", "random@x.com");
        assert_eq!(result.label, StrengthLabel::Strong);
        assert!(result.issues.is_empty());
        assert_eq!(result.headline(), None);
    }

    #[test]
    fn email_local_part_is_flagged() {
        let result = evaluate("Abcdef1!", "abcdef1@y.com");
        assert!(result
            .issues
            .contains(&PasswordRule::NoEmailFragment.issue().to_string()));
        assert!(result
            .issues
            .contains(&PasswordRule::NoKeyboardRun.issue().to_string()));
        assert_eq!(result.label, StrengthLabel::Medium);
    }

    #[test]
    fn short_email_local_parts_are_not_checked() {
        let result = evaluate("Qa7!kz#Lm", "qa@school.test");
        assert!(result.is_strong());
    }

    #[test]
    fn unrelated_email_does_not_flag_a_lookalike_password() {
        let result = evaluate("Passw0rd!", "admin@school.com");
        assert!(!result
            .issues
            .contains(&PasswordRule::NoEmailFragment.issue().to_string()));
        assert!(!result
            .issues
            .contains(&PasswordRule::NotCommon.issue().to_string()));
    }

    #[test]
    fn issues_are_reported_in_rule_order() {
        let result = evaluate("aaa 1234", "someone@school.test");
        assert_eq!(
            result.issues,
            vec![
                "Do not use spaces.".to_string(),
                "Add at least one uppercase letter.".to_string(),
                "Avoid repeated characters (e.g., aaa).".to_string(),
                "Avoid simple number sequences (e.g., 1234).".to_string(),
            ]
        );
        assert_eq!(result.label, StrengthLabel::Medium);
        assert_eq!(result.headline(), Some("Do not use spaces."));
    }

    #[test]
    fn common_passwords_match_case_insensitively() {
        let result = evaluate("WELCOME", "x@y.com");
        assert!(result
            .issues
            .contains(&PasswordRule::NotCommon.issue().to_string()));
        assert_eq!(result.label, StrengthLabel::Weak);
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        assert!(evaluate("Tr0ub4dor&3  ", "random@x.com").is_strong());
    }

    #[test]
    fn medium_needs_length_and_three_classes() {
        assert_eq!(evaluate("Mango7tree", "x@y.com").label, StrengthLabel::Medium);
        assert_eq!(evaluate("mango7tree", "x@y.com").label, StrengthLabel::Weak);
        assert_eq!(evaluate("Ma7!", "x@y.com").label, StrengthLabel::Weak);
    }
}
