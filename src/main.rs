use nexus_feed_lib::cli::{CliOptions, USAGE};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(2);
        }
    };
    if options.help {
        println!("{USAGE}");
        return;
    }

    nexus_feed_lib::init_tracing();

    if let Err(error) = nexus_feed_lib::run(options).await {
        eprintln!("nexus-feed failed: {error}");
        std::process::exit(1);
    }
}
