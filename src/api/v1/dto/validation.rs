/*
 * Responsibility
 * - DTO の validate() が共有する形式チェック
 */

/// `local@domain.tld` shape: one `@`, no whitespace, a dot inside the domain.
pub(crate) fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Longest accepted phone number including the leading `+`.
/// Must match the width of `contacts.phone_number`.
pub(crate) const PHONE_MAX_LEN: usize = 16;

/// Optional leading `+`, then 10 to 15 of digits, spaces, `-`, `(`, `)`.
pub(crate) fn is_phone(s: &str) -> bool {
    let rest = s.strip_prefix('+').unwrap_or(s);
    let len = rest.chars().count();
    (10..=PHONE_MAX_LEN - 1).contains(&len)
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

pub(crate) fn char_len_between(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        for ok in ["a@b.c", "alice@x.com", "first.last+tag@mail.example.org"] {
            assert!(is_email(ok), "{ok}");
        }
        for bad in ["", "alice", "@x.com", "alice@", "alice@x", "a@@x.com", "a b@x.com", "a@.com", "a@x."] {
            assert!(!is_email(bad), "{bad}");
        }
    }

    #[test]
    fn phones() {
        for ok in ["5550100222", "+1 555 010 0222", "(555) 010-0222"] {
            assert!(is_phone(ok), "{ok}");
        }
        for bad in ["555-0100", "+1 555 010 0222 999", "555.010.0222", "++15550100222", "555010022a"] {
            assert!(!is_phone(bad), "{bad}");
        }
    }

    #[test]
    fn longest_phone_fits_the_column() {
        let longest = "+123456789012345";
        assert_eq!(longest.len(), PHONE_MAX_LEN);
        assert!(is_phone(longest));
        assert!(!is_phone("+1234567890123456"));

        let schema = include_str!("../../../../migrations/0001_users_and_contacts.sql");
        assert!(
            schema.contains(&format!("phone_number VARCHAR({PHONE_MAX_LEN})")),
            "contacts.phone_number is narrower than the validator allows"
        );
    }
}
