use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use practice_core::model::{
    AnswerLedger, AttemptId, AttemptRecord, Cluster, Level, OptionKey, Question, QuestionBank,
    QuestionId, SessionSettings,
};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    cluster: Cluster,
    attempts: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCluster { raw: String },
    InvalidAttempts { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCluster { raw } => write!(f, "invalid --cluster value: {raw}"),
            ArgsError::InvalidAttempts { raw } => write!(f, "invalid --attempts value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("DECA_DB_URL").unwrap_or_else(|_| "sqlite://practice.sqlite3?mode=rwc".into());
        let mut cluster = Cluster::Marketing;
        let mut attempts = std::env::var("DECA_SEED_ATTEMPTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--cluster" => {
                    let value = require_value(&mut args, "--cluster")?;
                    cluster = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCluster { raw: value.clone() })?;
                }
                "--attempts" => {
                    let value = require_value(&mut args, "--attempts")?;
                    attempts = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidAttempts { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            cluster,
            attempts,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://practice.sqlite3?mode=rwc)");
    eprintln!("  --cluster <name>          Career cluster of the seeded attempts (default: marketing)");
    eprintln!("  --attempts <n>            Number of finished attempts to append (default: 3)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DECA_DB_URL, DECA_SEED_ATTEMPTS");
}

const SAMPLES: [(&str, &str, &str); 4] = [
    ("Pricing", "Which pricing strategy sets a low initial price to gain share?", "B"),
    ("Channel Management", "Which intermediary buys in bulk and sells to retailers?", "A"),
    ("Promotion", "Which element of the promotional mix is paid and non-personal?", "C"),
    ("Market Planning", "What is the first step of a marketing plan?", "D"),
];

fn sample_bank() -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let mut questions = Vec::with_capacity(SAMPLES.len());
    for (i, (topic, stem, correct)) in SAMPLES.iter().enumerate() {
        let mut options = BTreeMap::new();
        for key in ["A", "B", "C", "D"] {
            options.insert(OptionKey::new(key)?, format!("Choice {key}"));
        }
        let question = Question::new(
            QuestionId::positional(i),
            *stem,
            options,
            OptionKey::new(*correct)?,
        )?
        .with_topic(Some((*topic).to_owned()));
        questions.push(question);
    }
    Ok(QuestionBank::new(questions)?)
}

async fn seed_attempts(
    storage: &Storage,
    cluster: Cluster,
    attempts: u32,
    now: DateTime<Utc>,
) -> Result<Vec<AttemptId>, Box<dyn std::error::Error>> {
    let bank = sample_bank()?;
    let question_count = u32::try_from(bank.len())?;
    let mut ids = Vec::with_capacity(usize::try_from(attempts)?);

    for i in 0..attempts {
        let started_at = now - Duration::days(i64::from(i) * 2) - Duration::minutes(10);
        let completed_at = started_at + Duration::minutes(6);

        // Get the first question wrong on every attempt so "Pricing" surfaces as weak.
        let ledger = AnswerLedger::from_entries(bank.iter().enumerate().map(|(n, q)| {
            let key = if n == 0 { "A" } else { q.correct().as_str() };
            (q.id().clone(), OptionKey::new(key).unwrap_or_else(|_| q.correct().clone()))
        }));

        let record = AttemptRecord::new(
            SessionSettings::new(cluster, Level::District, question_count),
            bank.clone(),
            ledger,
            started_at,
            completed_at,
        )?;
        ids.push(storage.attempts.append_attempt(&record).await?);
    }

    Ok(ids)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let ids = seed_attempts(&storage, args.cluster, args.attempts, now).await?;

    let listed: Vec<String> = ids.iter().map(ToString::to_string).collect();
    println!(
        "Seeded {} {} attempts into {} (ids: {})",
        ids.len(),
        args.cluster,
        args.db_url,
        listed.join(", ")
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
