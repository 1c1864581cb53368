use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod github;
mod protector;
mod repository;

use cli::Cli;
use config::{ConfigError, Environment, Settings};
use github::{Github, ProtectionTransport, types::ProtectionPolicy};
use protector::{BranchProtector, messages};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing subscriber; stdout is reserved for the operator report
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("branch_guard=info")),
        )
        .compact()
        .init();

    let env = Environment::capture(&cli.env_file);

    match start(&cli, &env, connect).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<Reported>() => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// A failure whose diagnostic has already been printed to the operator.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
struct Reported(ConfigError);

fn connect(settings: &Settings) -> anyhow::Result<Arc<dyn ProtectionTransport>> {
    let github = Github::new(
        &settings.api_url,
        settings.credential.expose(),
        settings.timeout,
    )?;
    Ok(Arc::new(github))
}

/// Resolves the settings and applies the policy to every planned branch.
///
/// `connect` is only called once the configuration is known to be valid, so
/// a missing credential never reaches the network.
async fn start<F>(cli: &Cli, env: &Environment, connect: F) -> anyhow::Result<()>
where
    F: FnOnce(&Settings) -> anyhow::Result<Arc<dyn ProtectionTransport>>,
{
    let settings = match Settings::resolve(cli, env) {
        Ok(settings) => settings,
        Err(ConfigError::MissingCredential) => {
            println!("{}", messages::missing_credential());
            return Err(Reported(ConfigError::MissingCredential).into());
        }
        Err(e) => return Err(e).context("Invalid configuration"),
    };
    info!(
        "Protecting {} branch(es) of {} via {}",
        settings.plan.len(),
        settings.repository,
        settings.api_url
    );

    let policy = ProtectionPolicy::default();

    if settings.dry_run {
        let targets: Vec<_> = settings
            .plan
            .iter()
            .map(|rule| (settings.repository.branch(rule.branch.as_str()), rule))
            .collect();
        let payload = serde_json::to_string_pretty(&policy)?;
        println!(
            "{}",
            messages::dry_run(settings.api_url.as_str(), &targets, &payload)
        );
        return Ok(());
    }

    let transport = connect(&settings)?;
    let protector = BranchProtector::new(transport, policy, settings.success_check);

    let report = protector.run(&settings.repository, &settings.plan).await?;
    info!(
        "Attempted {} (aborted: {})",
        report.attempted().join(", "),
        report.aborted
    );
    report.into_result()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use anyhow::anyhow;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::github::fake::RecordingTransport;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("branch-guard").chain(args.iter().copied())).unwrap()
    }

    fn token_env() -> Environment {
        [("GITHUB_TOKEN".to_string(), "abc123".to_string())]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_network_call() {
        let connects = AtomicUsize::new(0);
        let transport = Arc::new(RecordingTransport::new());

        let result = start(&cli(&[]), &Environment::default(), |_| {
            connects.fetch_add(1, Ordering::SeqCst);
            Ok(transport.clone() as Arc<dyn ProtectionTransport>)
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Reported>(),
            Some(Reported(ConfigError::MissingCredential))
        ));
        assert_eq!(connects.load(Ordering::SeqCst), 0);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_configuration_is_left_for_main_to_log() {
        let args = cli(&["--owner", "octo/cat"]);

        let err = start(&args, &token_env(), |_| Err(anyhow!("should not connect")))
            .await
            .unwrap_err();

        assert!(!err.is::<Reported>());
        assert!(format!("{:#}", err).starts_with("Invalid configuration"));
    }

    #[tokio::test]
    async fn test_dotenv_token_reaches_the_run() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"GITHUB_TOKEN=abc123\n").unwrap();
        let mut env = Environment::default();
        env.overlay_dotenv(file.path()).unwrap();
        let transport = Arc::new(RecordingTransport::new());

        let result = start(&cli(&[]), &env, |settings| {
            assert_eq!(settings.credential.expose(), "abc123");
            Ok(transport.clone() as Arc<dyn ProtectionTransport>)
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_main_failure_fails_the_process() {
        let transport = Arc::new(RecordingTransport::new().failing("main"));

        let result = start(&cli(&[]), &token_env(), |_| {
            Ok(transport.clone() as Arc<dyn ProtectionTransport>)
        })
        .await;

        assert!(result.is_err());
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].path.ends_with("/branches/main/protection"));
    }

    #[tokio::test]
    async fn test_develop_failure_still_succeeds() {
        let transport = Arc::new(RecordingTransport::new().failing("develop"));

        let result = start(&cli(&[]), &token_env(), |_| {
            Ok(transport.clone() as Arc<dyn ProtectionTransport>)
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_strict_flag_makes_develop_failure_fatal() {
        let transport = Arc::new(RecordingTransport::new().failing("develop"));

        let result = start(&cli(&["--strict"]), &token_env(), |_| {
            Ok(transport.clone() as Arc<dyn ProtectionTransport>)
        })
        .await;

        assert!(result.is_err());
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_connect() {
        let connects = AtomicUsize::new(0);

        let result = start(&cli(&["--dry-run"]), &token_env(), |_| {
            connects.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("should not connect"))
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_against_mock_github() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        for branch in ["main", "develop"] {
            Mock::given(method("PUT"))
                .and(path(format!(
                    "/repos/octocat/hello/branches/{branch}/protection"
                )))
                .and(header("authorization", "token abc123"))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let uri = mock_server.uri();
        let args = cli(&["--owner", "octocat", "--repo", "hello", "--api-url", &uri]);
        let result = start(&args, &token_env(), connect).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_branch_name_is_escaped_on_the_wire() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/octocat/hello/branches/fix%2312/protection"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octocat/hello/branches/a%252Fb/protection"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let args = cli(&[
            "--owner", "octocat", "--repo", "hello", "--api-url", &uri, "--strict",
            "--branch", "fix#12", "--branch", "a%2Fb",
        ]);
        let result = start(&args, &token_env(), connect).await;

        assert!(result.is_ok());
        let received = mock_server.received_requests().await.unwrap();
        let paths: Vec<_> = received.iter().map(|r| r.url.path().to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "/repos/octocat/hello/branches/fix%2312/protection",
                "/repos/octocat/hello/branches/a%252Fb/protection",
            ]
        );
    }
}
