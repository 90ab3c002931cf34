use clap::{Parser, Subcommand};
use octofhir_fhirtest::{
    AuthConfig, FhirTestConfig, FhirTestManager, ReportSummary, TestCategory, TestEnvironment,
    TestFilter, TestStatus,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fhirtest")]
#[command(about = "Conformance and performance testing for FHIR servers")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered test cases and suites
    List {
        /// Only show test cases of this category (e.g. conformance, performance)
        #[arg(long)]
        category: Option<String>,
    },
    /// Run a test case or a suite against a server
    Run {
        /// Base URL of the FHIR server (e.g. https://hapi.fhir.org/baseR4)
        #[arg(short, long)]
        server: String,
        /// Test case id to run
        #[arg(short, long, conflicts_with = "suite", required_unless_present = "suite")]
        test: Option<String>,
        /// Test suite id to run
        #[arg(long)]
        suite: Option<String>,
        /// Report format (html, json, xml); defaults to the suite's or the configured format
        #[arg(short, long)]
        format: Option<String>,
        /// Directory the report is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// FHIR version declared by the server (r4, r4b, r5, r6)
        #[arg(long, default_value = "r4")]
        fhir_version: String,
        /// Client identity sent as User-Agent
        #[arg(long)]
        client_id: Option<String>,
        /// Bearer token for authenticated servers
        #[arg(long, conflicts_with = "basic_user")]
        bearer_token: Option<String>,
        /// Username for HTTP basic authentication
        #[arg(long, requires = "basic_password")]
        basic_user: Option<String>,
        /// Password for HTTP basic authentication
        #[arg(long)]
        basic_password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FhirTestConfig::from_file(path)?,
        None => FhirTestConfig::default(),
    };

    match cli.command {
        Commands::List { category } => {
            list_tests(config, category.as_deref()).await?;
        }
        Commands::Run {
            server,
            test,
            suite,
            format,
            output,
            fhir_version,
            client_id,
            bearer_token,
            basic_user,
            basic_password,
        } => {
            let auth = match (bearer_token, basic_user, basic_password) {
                (Some(token), _, _) => AuthConfig::Bearer { token },
                (None, Some(username), Some(password)) => AuthConfig::Basic { username, password },
                _ => AuthConfig::None,
            };

            let mut environment = TestEnvironment::parse("cli", &server)?
                .with_fhir_version(fhir_version.parse()?)
                .with_auth(auth);
            if let Some(client_id) = client_id {
                environment = environment.with_client_id(client_id);
            }

            let passed = run_tests(
                config,
                &environment,
                test.as_deref(),
                suite.as_deref(),
                format.as_deref(),
                &output,
            )
            .await?;

            if !passed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn list_tests(
    config: FhirTestConfig,
    category: Option<&str>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let manager = FhirTestManager::new(config).await?;

    let test_cases = match category {
        Some(category) => {
            let category: TestCategory = serde_json::from_value(serde_json::Value::String(
                category.to_ascii_lowercase(),
            ))?;
            manager
                .filter_test_cases(&TestFilter::new().with_category(category))
                .await
        }
        None => manager.get_all_test_cases().await,
    };

    println!("Test cases ({}):", test_cases.len());
    for test_case in &test_cases {
        println!(
            "  {:<32} {:<16} {:<9} {}",
            test_case.id,
            format!("{:?}", test_case.category).to_lowercase(),
            format!("{:?}", test_case.severity).to_lowercase(),
            test_case.name
        );
    }

    let suites = manager.get_all_test_suites().await;
    println!("\nTest suites ({}):", suites.len());
    for suite in &suites {
        println!(
            "  {:<32} v{:<8} {} [{}]{}",
            suite.id,
            suite.version,
            suite.name,
            suite.test_case_ids.join(", "),
            if suite.config.stop_on_failure {
                " (stop on failure)"
            } else {
                ""
            }
        );
    }

    Ok(())
}

async fn run_tests(
    config: FhirTestConfig,
    environment: &TestEnvironment,
    test: Option<&str>,
    suite: Option<&str>,
    format: Option<&str>,
    output: &Path,
) -> std::result::Result<bool, Box<dyn std::error::Error>> {
    let manager = FhirTestManager::new(config).await?;

    let (results, suite_format) = match (test, suite) {
        (Some(test_id), _) => (
            vec![manager.execute_test_case(test_id, environment).await],
            None,
        ),
        (None, Some(suite_id)) => {
            let suite_format = manager
                .get_test_suite(suite_id)
                .await
                .map(|s| s.config.report_format);
            (
                manager.execute_test_suite(suite_id, environment).await,
                suite_format,
            )
        }
        (None, None) => return Err("either --test or --suite is required".into()),
    };

    for result in &results {
        let marker = match result.status {
            TestStatus::Passed => "PASS",
            TestStatus::Failed => "FAIL",
            TestStatus::Error => "ERR ",
            TestStatus::Skipped => "SKIP",
            TestStatus::Running => "....",
        };
        println!("{marker} {:<32} {:>6} ms", result.test_id, result.execution_time);
        if let Some(reason) = result.failure_reason() {
            println!("     {reason}");
        }
        for violation in &result.details.validation_errors {
            println!(
                "     at {}: expected {}, actual {}",
                violation.path,
                violation.expected,
                violation
                    .actual
                    .as_ref()
                    .map_or_else(|| "undefined".to_string(), |v| v.to_string())
            );
        }
    }

    let summary = ReportSummary::from_results(results.iter());
    println!(
        "\n{} passed, {} failed, {} errors, {} skipped",
        summary.passed, summary.failed, summary.errors, summary.skipped
    );

    let report = match format {
        Some(format) => manager.generate_test_report(format).await?,
        None => match suite_format {
            Some(format) => manager.generate_report_as(format).await?,
            None => manager.generate_default_report().await?,
        },
    };
    let path = report.write_to(output).await?;
    println!("Report written to {} ({})", path.display(), report.mime_type());

    Ok(summary.all_passed())
}
