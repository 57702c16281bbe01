use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;

pub const ADMIN_COOKIE: &str = "admin_session";

const SESSION_HOURS: i64 = 8;

/// Opaque admin session token.
///
/// The scheme is a plain equality check against the configured password,
/// carried verbatim in an HttpOnly cookie. Call sites only see issue/verify,
/// so the scheme can be replaced without touching them. This is not a
/// credential-issuance system.
#[derive(Clone)]
pub struct AdminSession {
    token: String,
}

impl AdminSession {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    pub fn verify(&self, presented: &str) -> bool {
        presented == self.token
    }

    pub fn is_authorized(&self, req: &HttpRequest) -> bool {
        req.cookie(ADMIN_COOKIE)
            .map(|cookie| self.verify(cookie.value()))
            .unwrap_or(false)
    }

    pub fn issue_cookie(&self) -> Cookie<'static> {
        Cookie::build(ADMIN_COOKIE, self.token.clone())
            .http_only(true)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(Duration::hours(SESSION_HOURS))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_exact_token_only() {
        let session = AdminSession::new("hunter2");
        assert!(session.verify("hunter2"));
        assert!(!session.verify("hunter"));
        assert!(!session.verify(""));
    }

    #[test]
    fn issued_cookie_is_http_only_and_strict() {
        let cookie = AdminSession::new("hunter2").issue_cookie();
        assert_eq!(cookie.name(), ADMIN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::hours(8)));
    }
}
