//! Identity-cookie gateway.
//!
//! Login hands the client two cookies: an `isLogined` flag and the bare
//! `userId`. The `userId` cookie is the credential: it is read back on
//! every authorization-sensitive request and trusted as-is. Neither cookie
//! is `HttpOnly` because the frontend reads them directly. Logout and
//! account deletion clear both.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::models::UserId;

/// Login-state flag cookie.
pub const IS_LOGGED_IN_COOKIE: &str = "isLogined";
/// Caller-identity cookie.
pub const USER_ID_COOKIE: &str = "userId";
/// Cookie lifetime in seconds (one hour).
pub const SESSION_MAX_AGE_SECS: u64 = 3600;

/// `Set-Cookie` values establishing a login.
pub fn login_cookies(user_id: UserId) -> [String; 2] {
    [
        format!(
            "{}=true; SameSite=Strict; Path=/; Max-Age={}",
            IS_LOGGED_IN_COOKIE, SESSION_MAX_AGE_SECS
        ),
        format!(
            "{}={}; SameSite=Strict; Path=/; Max-Age={}",
            USER_ID_COOKIE,
            user_id.value(),
            SESSION_MAX_AGE_SECS
        ),
    ]
}

/// `Set-Cookie` values clearing a login.
pub fn clear_login_cookies() -> [String; 2] {
    [
        format!("{}=; SameSite=Strict; Path=/; Max-Age=0", IS_LOGGED_IN_COOKIE),
        format!("{}=; SameSite=Strict; Path=/; Max-Age=0", USER_ID_COOKIE),
    ]
}

/// Find a cookie value in the request headers.
pub fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

/// The caller identity asserted by the `userId` cookie, or `None`.
///
/// Never rejects: handlers decide whether a missing identity is a 401, a
/// 403, or irrelevant, because the routes differ on that.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Option<UserId>);

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = get_cookie_value(parts, USER_ID_COOKIE)
            .and_then(|v| v.parse::<i64>().ok())
            .map(UserId::new);
        Ok(CallerIdentity(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookie(value: &str) -> Parts {
        let request = Request::builder()
            .header(header::COOKIE, value)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn cookie_value_is_extracted() {
        let parts = parts_with_cookie("isLogined=true; userId=42");
        assert_eq!(get_cookie_value(&parts, USER_ID_COOKIE), Some("42"));
        assert_eq!(get_cookie_value(&parts, IS_LOGGED_IN_COOKIE), Some("true"));
        assert_eq!(get_cookie_value(&parts, "other"), None);
    }

    #[test]
    fn login_cookies_carry_max_age() {
        let [flag, id] = login_cookies(UserId::new(7));
        assert!(flag.starts_with("isLogined=true"));
        assert!(flag.contains("Max-Age=3600"));
        assert!(id.starts_with("userId=7"));
    }

    #[test]
    fn clear_cookies_expire_immediately() {
        for cookie in clear_login_cookies() {
            assert!(cookie.contains("Max-Age=0"));
        }
    }
}
