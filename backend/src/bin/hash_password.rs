//! Prints the Argon2 hash for the shared site password, ready to paste
//! into SITE_PASSWORD_HASH.
//!
//! Usage: cargo run --bin hash_password -- <password>

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};

fn main() {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("usage: hash_password <password>");
        std::process::exit(1);
    };

    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            eprintln!("failed to hash password: {}", e);
            std::process::exit(1);
        }
    }
}
