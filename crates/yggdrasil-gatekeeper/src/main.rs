use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use yggdrasil_gatekeeper::{Cli, GatekeeperError, GatekeeperServerBuilder};
use yggdrasil_progression::{InMemoryProgressionRepository, ProgressionTracker};
use yggdrasil_realm::FlagSigner;
use yggdrasil_session::{PasswordAuthenticator, UserDirectory};

#[actix_web::main]
async fn main() -> Result<(), GatekeeperError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let users = Arc::new(UserDirectory::new(cli.bcrypt_rounds)?);
    let seeded = users.seed_default(&cli.test_user_password).await?;
    tracing::info!(username = %seeded.username, "default user ready");

    let signer = FlagSigner::new(&cli.flag_secret())?;
    let tracker = ProgressionTracker::new(InMemoryProgressionRepository::new(), signer);

    let server = GatekeeperServerBuilder::new()
        .bind(&cli.listen_addr())
        .session_config(cli.session_config())
        .rate_limit(cli.rate_limit_config())
        .flag_rate_limit(cli.flag_rate_limit_config())
        .cookie_secure(cli.cookie_secure)
        .internal_token(cli.internal_api_token.clone())
        .build(PasswordAuthenticator::new(users), tracker)?;

    server.run().await
}
