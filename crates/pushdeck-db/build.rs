//! Build script for embedded migrations.
//!
//! `sqlx::migrate!` embeds `migrations/` at compile time, so a new or edited
//! migration must trigger a rebuild.

fn main() {
    println!("cargo:rerun-if-changed=migrations/");
}
