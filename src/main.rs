//! Service entrypoint: wire configuration, logging, storage, and the push
//! gateway together, then hand control to the recalculation scheduler.
//!
//! With `DATABASE_URL` set (environment or `.env`), the scheduler runs
//! against Postgres. Without it, the service runs in demo mode against an
//! in-memory store seeded from the demo registry — useful for local
//! development without a database.

use std::error::Error;
use std::time::Duration;

use aquarisk_service::analysis::forecast::LinearForecaster;
use aquarisk_service::config::{self, ServiceConfig, DEFAULT_CONFIG_PATH};
use aquarisk_service::logging::{LogLevel, Logger, Subsystem};
use aquarisk_service::push::ExpoPushClient;
use aquarisk_service::realtime::StdoutPublisher;
use aquarisk_service::scheduler;
use aquarisk_service::seed;
use aquarisk_service::store::memory::MemoryStore;
use aquarisk_service::store::pg::PgStore;
use aquarisk_service::store::RiskStore;

fn main() {
    if let Err(e) = run() {
        eprintln!("Fatal: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ServiceConfig::load(&config_path)?;

    let min_level = LogLevel::parse(&config.logging.level).unwrap_or(LogLevel::Info);
    let logger = Logger::new(min_level, config.logging.file.clone(), true);

    let mut store: Box<dyn RiskStore> = match config::database_url() {
        Ok(url) => {
            logger.info(Subsystem::Database, None, "Connecting to Postgres");
            Box::new(PgStore::connect(&url)?)
        }
        Err(_) => {
            logger.warn(
                Subsystem::System,
                None,
                "DATABASE_URL not set, running demo mode with in-memory store",
            );
            let mut memory = MemoryStore::new();
            seed::load_demo(&mut memory)?;
            Box::new(memory)
        }
    };

    let gateway = ExpoPushClient::new(&config.push)?;
    let model = LinearForecaster;
    let mut publisher = StdoutPublisher;
    let mut rng = rand::thread_rng();

    let interval = Duration::from_secs(config.scheduler.interval_hours * 3600);
    logger.info(
        Subsystem::System,
        None,
        &format!(
            "Starting recalculation scheduler (every {}h)",
            config.scheduler.interval_hours
        ),
    );

    scheduler::run_forever(
        store.as_mut(),
        &mut publisher,
        &gateway,
        &model,
        &logger,
        &mut rng,
        interval,
    )
}
