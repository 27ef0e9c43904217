//! VitalScore — client-side health-report analysis and score tracking.
//!
//! Upload a report (.txt or .pdf), have an AI model produce a health score
//! and a 14-day action plan, then raise the score by checking items off.
//! The derived score persists across sessions in a local per-user document
//! store; every checklist mutation is applied optimistically and written
//! through.
//!
//! Typical embedding:
//!
//! ```no_run
//! use std::sync::Arc;
//! use vitalscore::analyzer::OllamaAnalyzer;
//! use vitalscore::controller::SyncController;
//! use vitalscore::store::DocumentStore;
//!
//! vitalscore::config::init_tracing();
//! let store = Arc::new(DocumentStore::open(&vitalscore::config::store_path()).unwrap());
//! let analyzer = Arc::new(OllamaAnalyzer::default_local("medgemma"));
//! let controller = SyncController::new(store, analyzer);
//! controller.start_session().unwrap();
//! ```

pub mod analyzer;
pub mod config;
pub mod controller;
pub mod extraction;
pub mod models;
pub mod score;
pub mod session;
pub mod store;

pub use analyzer::{AnalysisError, ReportAnalysis, ReportAnalyzer};
pub use controller::{ActiveAnalysis, ControllerError, SyncController};
pub use extraction::{extract_report_text, ExtractionError};
pub use models::{DayPlan, HealthDocument, PlanTask, SessionUser, Suggestion};
pub use session::{SessionError, SessionProvider};
pub use store::{DocumentPatch, DocumentStore, StoreError, Subscription};
