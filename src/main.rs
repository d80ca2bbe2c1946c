use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tokio::io::BufReader;
use tokio::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use student_risk_dashboard::client::{ApiClient, Gateway};
use student_risk_dashboard::config::ClientConfig;
use student_risk_dashboard::models::{RiskFilter, StudentInput};
use student_risk_dashboard::options::{FormOptions, OptionsSource};
use student_risk_dashboard::session::{FormEdit, PredictionSession, StudentForm};
use student_risk_dashboard::students::StudentListController;
use student_risk_dashboard::{analytics, browse, export, report, risk};

#[derive(Parser)]
#[command(name = "risk-dashboard")]
#[command(about = "Student depression risk dashboard client", long_about = None)]
struct Cli {
    /// Backend base URL, overrides RISK_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one student profile
    Predict {
        /// JSON file with a complete profile to start from
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        profile: ProfileArgs,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List previously scored students
    Students {
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "risk", default_value = "all")]
        risk_filter: RiskFilter,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Write the loaded page as CSV into this directory
        #[arg(long = "export")]
        export_dir: Option<PathBuf>,
    },
    /// Browse the student list interactively
    Browse,
    /// Cohort analytics as a markdown report
    Analytics {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the options offered by the prediction form
    Columns,
    /// Check whether the backend and its model are available
    Health,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    age: Option<u8>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    profession: Option<String>,
    #[arg(long)]
    academic_pressure: Option<u8>,
    #[arg(long)]
    work_pressure: Option<u8>,
    #[arg(long)]
    cgpa: Option<f64>,
    #[arg(long)]
    study_satisfaction: Option<u8>,
    #[arg(long)]
    job_satisfaction: Option<u8>,
    #[arg(long)]
    sleep: Option<String>,
    #[arg(long)]
    diet: Option<String>,
    #[arg(long)]
    degree: Option<String>,
    #[arg(long)]
    hours: Option<u8>,
    #[arg(long)]
    financial_stress: Option<u8>,
    #[arg(long)]
    family_history: Option<String>,
    #[arg(long)]
    suicidal_thoughts: Option<String>,
}

impl ProfileArgs {
    fn into_edits(self) -> Vec<FormEdit> {
        let edits = [
            self.gender.map(FormEdit::Gender),
            self.age.map(FormEdit::Age),
            self.city.map(FormEdit::City),
            self.profession.map(FormEdit::Profession),
            self.academic_pressure.map(FormEdit::AcademicPressure),
            self.work_pressure.map(FormEdit::WorkPressure),
            self.cgpa.map(FormEdit::Cgpa),
            self.study_satisfaction.map(FormEdit::StudySatisfaction),
            self.job_satisfaction.map(FormEdit::JobSatisfaction),
            self.sleep.map(FormEdit::SleepDuration),
            self.diet.map(FormEdit::DietaryHabits),
            self.degree.map(FormEdit::Degree),
            self.hours.map(FormEdit::WorkStudyHours),
            self.financial_stress.map(FormEdit::FinancialStress),
            self.family_history.map(FormEdit::FamilyHistory),
            self.suicidal_thoughts.map(FormEdit::SuicidalThoughts),
        ];
        edits.into_iter().flatten().collect()
    }
}

fn warn_unlisted(options: &FormOptions, draft: &StudentInput) {
    let checks = [
        ("sleep duration", &draft.sleep_duration, options.sleep_durations()),
        ("dietary habits", &draft.dietary_habits, options.dietary_habits()),
        ("degree", &draft.degree, options.degrees()),
        ("gender", &draft.gender, options.genders()),
    ];
    for (field, value, allowed) in checks {
        if !allowed.iter().any(|a| a == value) {
            tracing::warn!(field, value = %value, "value is not among the dataset's options");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_risk_dashboard=info,risk_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }
    let client = ApiClient::new(&config).context("failed to build HTTP client")?;
    tracing::debug!(api_url = %client.api_url(), "client configured");

    match cli.command {
        Commands::Predict {
            input,
            profile,
            json,
        } => {
            let mut form = match input {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let input: StudentInput = serde_json::from_str(&raw)
                        .with_context(|| format!("{} is not a student profile", path.display()))?;
                    StudentForm::from_input(input)?
                }
                None => StudentForm::default(),
            };
            for edit in profile.into_edits() {
                form.apply(edit)?;
            }

            let options = FormOptions::load(&client).await;
            warn_unlisted(&options, form.draft());

            let mut session = PredictionSession::new(form);
            session.submit(&client).await?;
            let Some(result) = session.displayed() else {
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
                return Ok(());
            }

            println!(
                "{} ({}%, gauge {})",
                risk::prediction_badge(result.risk_level),
                result.probability,
                risk::gauge_value(result.probability)
            );
            if result.contributing_factors.is_empty() {
                println!("No contributing factors identified.");
            } else {
                println!("Contributing factors:");
                for factor in &result.contributing_factors {
                    println!("- {factor}");
                }
            }
        }
        Commands::Students {
            search,
            risk_filter,
            page,
            export_dir,
        } => {
            let mut controller = StudentListController::default();
            if let Some(search) = search {
                controller.set_search(search, Instant::now());
            }
            controller.set_risk_filter(risk_filter);
            controller.go_to_page(page);
            controller.refresh(&client).await;

            if let Some(error) = controller.error() {
                anyhow::bail!("{error}");
            }
            print!("{}", browse::render(&controller));

            if let Some(dir) = export_dir {
                let today = Utc::now().date_naive();
                match export::export_page(controller.data(), today)? {
                    Some(file) => {
                        let path = file.write_to(&dir)?;
                        println!("CSV written to {}.", path.display());
                    }
                    None => println!("No students on this page; nothing exported."),
                }
            }
        }
        Commands::Browse => {
            let stdin = BufReader::new(tokio::io::stdin());
            browse::run(client, stdin).await?;
        }
        Commands::Analytics { out } => {
            let view = analytics::load(&client).await?;
            let report = report::build_report(&view, Utc::now().date_naive());
            match out {
                Some(out) => {
                    std::fs::write(&out, report)?;
                    println!("Report written to {}.", out.display());
                }
                None => print!("{report}"),
            }
        }
        Commands::Columns => {
            let options = FormOptions::load(&client).await;
            if options.source == OptionsSource::BuiltIn {
                tracing::info!("backend options unavailable, showing built-in lists");
            }
            let columns = &options.columns;
            let lists = [
                ("Cities", &columns.cities),
                ("Professions", &columns.professions),
                ("Degrees", &columns.degrees),
                ("Sleep durations", &columns.sleep_durations),
                ("Dietary habits", &columns.dietary_habits),
                ("Genders", &columns.genders),
            ];
            for (label, values) in lists {
                if values.is_empty() {
                    println!("{label}: (free text)");
                } else {
                    println!("{label}: {}", values.join(", "));
                }
            }
        }
        Commands::Health => {
            let health = client.health().await;
            if health.is_available() {
                println!("Backend ready at {} (model loaded).", client.api_url());
            } else {
                println!(
                    "Backend unavailable at {}{}",
                    client.api_url(),
                    health
                        .detail
                        .map(|d| format!(": {d}"))
                        .unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
