//! Prints a bcrypt hash of the admin password for `ADMIN_HASH_PASSWORD`.

use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let mut args = env::args().skip(1);
    let password = args.next().unwrap_or_else(|| {
        eprintln!("Usage: hash-password <PASSWORD> [COST]");
        std::process::exit(1);
    });
    let cost = match args.next() {
        Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
            eprintln!("COST must be a number between 4 and 31");
            std::process::exit(1);
        }),
        None => DEFAULT_COST,
    };

    if password.len() < 8 {
        eprintln!("warning: passwords shorter than 8 characters are easy to guess");
    }

    match hash(&password, cost) {
        Ok(hashed) => {
            println!("\nCost     : {}", cost);
            println!("Hash     : {}\n", hashed);
            println!("# Paste this into your .env:");
            println!("ADMIN_HASH_PASSWORD={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
