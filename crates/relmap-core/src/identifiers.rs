//! SQL identifier quoting.
//!
//! Identifiers are only quoted when they have to be: when they are not plain
//! (`[A-Za-z_][A-Za-z0-9_$]*`) or collide with a reserved word. Dialects may
//! force quoting of every identifier instead.

/// Words reserved by (practically) every SQL product.
const COMMON_RESERVED: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXISTS", "FALSE", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN", "INDEX",
    "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT", "NULL",
    "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET",
    "TABLE", "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN",
    "WHERE", "WITH",
];

/// Quote a SQL identifier using ANSI double-quoting.
///
/// Embedded double-quotes are doubled.
///
/// ```
/// use relmap_core::quote_ident;
///
/// assert_eq!(quote_ident("users"), "\"users\"");
/// assert_eq!(quote_ident("user\"name"), "\"user\"\"name\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a SQL identifier using MySQL backticks.
#[inline]
pub fn quote_ident_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Does `name` match `[A-Za-z_][A-Za-z0-9_$]*`?
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Is `word` reserved in every dialect, or in the dialect-specific `extra` list?
pub fn is_reserved(word: &str, extra: &[&str]) -> bool {
    let upper = word.to_ascii_uppercase();
    COMMON_RESERVED.binary_search(&upper.as_str()).is_ok()
        || extra.iter().any(|w| w.eq_ignore_ascii_case(word))
}

/// Quote `name` with `quote` only if it is not a plain, unreserved identifier.
pub fn quote_if_needed(name: &str, extra_reserved: &[&str], quote: fn(&str) -> String) -> String {
    if is_plain_identifier(name) && !is_reserved(name, extra_reserved) {
        name.to_string()
    } else {
        quote(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_list_is_sorted() {
        assert!(COMMON_RESERVED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn quote_escapes_embedded_quotes() {
        assert_eq!(quote_ident(""), "\"\"");
        assert_eq!(quote_ident("a\"b\"c"), "\"a\"\"b\"\"c\"");
        assert_eq!(quote_ident_mysql("user`name"), "`user``name`");
    }

    #[test]
    fn plain_identifiers() {
        assert!(is_plain_identifier("Person"));
        assert!(is_plain_identifier("_x1"));
        assert!(is_plain_identifier("GEO_LOCATION$LATITUDE"));
        assert!(!is_plain_identifier("1abc"));
        assert!(!is_plain_identifier("first name"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("naïve"));
    }

    #[test]
    fn quoting_only_when_needed() {
        assert_eq!(quote_if_needed("Person", &[], quote_ident), "Person");
        assert_eq!(quote_if_needed("order", &[], quote_ident), "\"order\"");
        assert_eq!(quote_if_needed("my col", &[], quote_ident_mysql), "`my col`");
        assert_eq!(quote_if_needed("RANK", &["RANK"], quote_ident), "\"RANK\"");
        assert_eq!(quote_if_needed("rank", &[], quote_ident), "rank");
    }
}
