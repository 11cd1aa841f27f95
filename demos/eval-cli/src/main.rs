//! Evaluate one expression on a live sandbox.
//!
//! Run with: cargo run -p eval-cli -- "dw.system.Site.getCurrent().getID()"
//!
//! Connection details come from the environment: `B2C_HOSTNAME` plus either
//! `B2C_USERNAME`/`B2C_PASSWORD` or `B2C_CLIENT_ID`/`B2C_CLIENT_SECRET`,
//! optionally `B2C_CODE_VERSION` and `B2C_SITE_ID`.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use b2c_eval_core::{ConnectionConfig, EvaluationRequest};
use b2c_eval_session::Orchestrator;
use b2c_eval_transport::ReqwestTransport;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let expression = env::args()
        .nth(1)
        .context("usage: eval-cli <expression>")?;
    let hostname = env::var("B2C_HOSTNAME").context("B2C_HOSTNAME is not set")?;

    let mut config = ConnectionConfig::new(hostname);
    if let (Ok(username), Ok(password)) = (env::var("B2C_USERNAME"), env::var("B2C_PASSWORD")) {
        config = config.with_basic_auth(username, password);
    }
    if let (Ok(id), Ok(secret)) = (env::var("B2C_CLIENT_ID"), env::var("B2C_CLIENT_SECRET")) {
        config = config.with_client_pair(id, secret);
    }
    if let Ok(version) = env::var("B2C_CODE_VERSION") {
        config = config.with_code_version(version);
    }

    let mut request = EvaluationRequest::new(expression);
    if let Ok(site_id) = env::var("B2C_SITE_ID") {
        request = request.with_site_id(site_id);
    }

    let orchestrator = Orchestrator::new(Arc::new(ReqwestTransport::new()), config);
    let result = orchestrator.evaluate(request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
