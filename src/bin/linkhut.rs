use anyhow::Result;

use linkhut_cli::{config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    logging::init(false);
    config::report_dotenv(&dotenv);

    linkhut_cli::dump_posts().await
}
