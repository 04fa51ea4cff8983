use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
    .unwrap_or_else(|e| panic!("email regex must compile: {e}"))
});

const EMAIL_MAX: usize = 254;
const MEMBER_ID_MAX: usize = 128;

pub fn is_valid_email(email: &str) -> bool {
  email.len() <= EMAIL_MAX && EMAIL_REGEX.is_match(email)
}

/// Member IDs are supplied by the caller, so we only make sure
/// they are usable as a path segment.
pub fn is_valid_member_id(id: &str) -> bool {
  !id.is_empty()
    && id.len() <= MEMBER_ID_MAX
    && !id.contains(|c: char| c == '/' || c.is_whitespace() || c.is_control())
}
