/// How strictly the scheme word of `Authorization: <scheme> <token>` is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemePolicy {
    /// Any scheme word is accepted; only the token segment matters.
    #[default]
    Any,
    /// The scheme word must be `Bearer` (ASCII case-insensitive).
    Bearer,
}

/// Pull the token candidate out of an `Authorization` header value.
///
/// The value is split on whitespace and the second segment is the candidate;
/// anything after it is ignored. `None` means "no credential supplied", which
/// is a different outcome from a credential that later fails verification.
pub fn extract_credential(header: Option<&str>, policy: SchemePolicy) -> Option<&str> {
    let mut segments = header?.split_whitespace();
    let scheme = segments.next()?;
    let token = segments.next()?;

    match policy {
        SchemePolicy::Any => Some(token),
        SchemePolicy::Bearer if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        SchemePolicy::Bearer => None,
    }
}
