#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

#[tokio::main]
async fn main() {
    if let Err(e) = birthday_keeper::run().await {
        eprintln!("birthday-keeper failed: {e}");
        std::process::exit(1);
    }
}
