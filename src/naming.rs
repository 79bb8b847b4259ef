//! Naming: prefix stripping and Go identifier casing.
//!
//! ```
//! use gormgen::naming::{strip_prefix, to_go_name, to_snake};
//!
//! let prefixes = vec!["t_".to_string()];
//! assert_eq!(strip_prefix("t_user", &prefixes), Some("user"));
//! assert_eq!(to_go_name("user_id"), "UserID");
//! assert_eq!(to_snake("userName"), "user_name");
//! ```

use inflector::string::pluralize::to_plural;

use crate::error::{GenError, GenResult};

/// Go's common initialisms, written all-caps in identifiers.
const INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

/// Strip the longest matching prefix.
///
/// A prefix only matches on an underscore boundary: either it ends with `_`
/// itself, or the name continues with `_` (which is dropped too). Returns
/// `None` when nothing was stripped; a prefix never consumes the whole name.
pub fn strip_prefix<'a>(name: &'a str, prefixes: &[String]) -> Option<&'a str> {
    let mut best: Option<(usize, &'a str)> = None;
    for prefix in prefixes.iter().filter(|p| !p.is_empty()) {
        let Some(rest) = name.strip_prefix(prefix.as_str()) else {
            continue;
        };
        let rest = if prefix.ends_with('_') {
            rest
        } else {
            match rest.strip_prefix('_') {
                Some(r) => r,
                None => continue,
            }
        };
        if rest.is_empty() {
            continue;
        }
        if best.is_none_or(|(len, _)| prefix.len() > len) {
            best = Some((prefix.len(), rest));
        }
    }
    best.map(|(_, rest)| rest)
}

/// Split an identifier into words on separators and camel-case boundaries.
/// Digits stay with the word before them.
pub fn split_words(ident: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let chars: Vec<(usize, char)> = ident.char_indices().collect();
    let mut start: Option<usize> = None;

    for (n, &(i, c)) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if let Some(s) = start.take() {
                words.push(&ident[s..i]);
            }
            continue;
        }
        let Some(s) = start else {
            start = Some(i);
            continue;
        };
        let prev = chars[n - 1].1;
        let next = chars.get(n + 1).map(|&(_, c)| c);
        let boundary = c.is_uppercase()
            && (prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase())));
        if boundary {
            words.push(&ident[s..i]);
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(&ident[s..]);
    }
    words
}

fn go_word(word: &str) -> String {
    let upper = word.to_uppercase();
    if INITIALISMS.contains(&upper.as_str()) {
        return upper;
    }
    let letters = word.chars().filter(|c| c.is_alphabetic()).count();
    if letters > 1 && !word.chars().any(|c| c.is_lowercase()) {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Exported Go identifier for a SQL name: `user_id` -> `UserID`.
pub fn to_go_name(ident: &str) -> String {
    split_words(ident).into_iter().map(go_word).collect()
}

/// Lower snake case: `userName` -> `user_name`.
pub fn to_snake(ident: &str) -> String {
    split_words(ident)
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Table name GORM assumes for a struct without a `TableName()` method:
/// `UserInfo` -> `user_infos`.
pub fn gorm_table_name(struct_name: &str) -> String {
    to_plural(&to_snake(struct_name))
}

/// [`to_go_name`], rejecting results that are not exported Go identifiers.
/// Go only exports names starting with an upper-case letter, so a name such
/// as `名字` is refused. `what` names the source for the error message,
/// e.g. ``column `1st` ``.
pub fn go_identifier(ident: &str, table: &str, what: &str) -> GenResult<String> {
    let name = to_go_name(ident);
    if name.chars().next().is_some_and(char::is_uppercase) {
        Ok(name)
    } else {
        Err(GenError::schema(
            table,
            format!("{} does not produce an exported Go identifier (got '{}')", what, name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_prefix_boundary() {
        let p = prefixes(&["t_"]);
        assert_eq!(strip_prefix("t_user", &p), Some("user"));
        assert_eq!(strip_prefix("tuser", &p), None);
        assert_eq!(strip_prefix("t_", &p), None);
        assert_eq!(strip_prefix("T_user", &p), None);

        let p = prefixes(&["t"]);
        assert_eq!(strip_prefix("t_user", &p), Some("user"));
        assert_eq!(strip_prefix("tuser", &p), None);
    }

    #[test]
    fn test_strip_longest_prefix() {
        let p = prefixes(&["t_", "t_sys_", ""]);
        assert_eq!(strip_prefix("t_sys_log", &p), Some("log"));
        assert_eq!(strip_prefix("t_user", &p), Some("user"));
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("user_name"), vec!["user", "name"]);
        assert_eq!(split_words("userName"), vec!["user", "Name"]);
        assert_eq!(split_words("HTTPStatus"), vec!["HTTP", "Status"]);
        assert_eq!(split_words("md5Sum"), vec!["md5", "Sum"]);
        assert_eq!(split_words("address2_line"), vec!["address2", "line"]);
        assert_eq!(split_words("__a--b c.d$e"), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_to_go_name() {
        assert_eq!(to_go_name("id"), "ID");
        assert_eq!(to_go_name("user_id"), "UserID");
        assert_eq!(to_go_name("userName"), "UserName");
        assert_eq!(to_go_name("user_name"), "UserName");
        assert_eq!(to_go_name("HTTPStatus"), "HTTPStatus");
        assert_eq!(to_go_name("avatar_url"), "AvatarURL");
        assert_eq!(to_go_name("NASA_code"), "NASACode");
        assert_eq!(to_go_name("order"), "Order");
        assert_eq!(to_go_name("payment_events"), "PaymentEvents");
    }

    #[test]
    fn test_to_snake() {
        assert_eq!(to_snake("userName"), "user_name");
        assert_eq!(to_snake("UserID"), "user_id");
        assert_eq!(to_snake("created_at"), "created_at");
        assert_eq!(to_snake("HTTPStatus"), "http_status");
    }

    #[test]
    fn test_invalid_identifier() {
        assert!(go_identifier("1st_place", "t", "column `1st_place`").is_err());
        assert!(go_identifier("__", "t", "column `__`").is_err());
        assert_eq!(go_identifier("x", "t", "column `x`").unwrap(), "X");
        assert_eq!(go_identifier("über", "t", "column `über`").unwrap(), "Über");
    }

    #[test]
    fn test_unexported_identifier() {
        let err = go_identifier("名字", "a", "column `名字`").unwrap_err();
        assert!(matches!(err, GenError::Schema { .. }));
        assert!(err.to_string().contains("exported Go identifier"));
    }

    #[test]
    fn test_gorm_table_name() {
        assert_eq!(gorm_table_name("User"), "users");
        assert_eq!(gorm_table_name("UserInfo"), "user_infos");
        assert_eq!(gorm_table_name("Category"), "categories");
        assert_eq!(gorm_table_name("OrderID"), "order_ids");
    }
}
