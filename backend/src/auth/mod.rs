use argon2::{
    password_hash::{
        rand_core::OsRng,
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use cookie::{Cookie, SameSite};

pub mod middleware;
pub mod routes;

pub const AUTH_COOKIE: &str = "auth";
pub const AUTH_COOKIE_VALUE: &str = "authenticated";
const AUTH_COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Hash the shared site password with Argon2, for SITE_PASSWORD_HASH.
pub fn hash_site_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a submitted password against the configured Argon2 hash.
pub fn verify_site_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, AUTH_COOKIE_VALUE);
    cookie.set_http_only(true);
    cookie.set_secure(std::env::var("COOKIE_SECURE").unwrap_or_else(|_| "true".to_string()) == "true");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::days(AUTH_COOKIE_MAX_AGE_DAYS));
    cookie
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hash = hash_site_password("vinlotteri").unwrap();
        assert!(verify_site_password("vinlotteri", &hash));
        assert!(!verify_site_password("feil passord", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_site_password("whatever", "not-a-phc-string"));
    }
}
