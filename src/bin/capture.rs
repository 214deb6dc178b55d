//! Fetches a page, extracts its main text and submits it to the backend.
//!
//! Usage: `capture [--api <backend-url>] <page-url>`

use page_digest::{client::CaptureClient, config::ClientConfig, extractor, logging};
use tracing::error;

fn usage() -> ! {
    eprintln!("usage: capture [--api <backend-url>] <page-url>");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut api = None;
    let mut target = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--api" {
            api = Some(args.next().unwrap_or_else(|| usage()));
        } else if arg == "-h" || arg == "--help" || target.is_some() {
            usage();
        } else {
            target = Some(arg);
        }
    }
    let target = target.unwrap_or_else(|| usage());

    let config = ClientConfig::load(api);
    let client = CaptureClient::new(&config)?;

    let page = match extractor::capture_page(&target).await {
        Ok(page) => page,
        Err(err) => {
            error!(url = %target, error = %err, "capture aborted");
            return Err(err.into());
        }
    };

    let receipt = client.submit(&page).await?;
    println!(
        "Captured {} words from {} (id {})",
        receipt.word_count, receipt.url, receipt.id
    );
    Ok(())
}
