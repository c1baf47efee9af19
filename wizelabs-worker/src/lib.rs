///! # Wizelabs Worker Library
///!
///! Background synchronisation for the Wizelabs portal.
///!
///! ## Modules
///!
///! - `config`: worker settings from the environment
///! - `github`: GitHub REST client and activity/release ingestion
///! - `consolidation`: employee profile sync from the data warehouse
///! - `scheduler`: interval loop running the sync jobs
///! - `jobs`: the jobs themselves
///!
///! ## Example
///!
///! ```no_run
///! use wizelabs_worker::scheduler::SyncScheduler;
///! use std::time::Duration;
///!
///! # async fn example() {
///! let scheduler = SyncScheduler::new(Duration::from_secs(3600));
///! println!("{} jobs registered", scheduler.job_count());
///! # }
///! ```

pub mod config;
pub mod consolidation;
pub mod github;
pub mod jobs;
pub mod scheduler;
