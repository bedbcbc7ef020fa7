//! A composable query language for driving a build-orchestration server
//! over HTTP.
//!
//! Programs are assembled from a small set of primitives and executed
//! against a live connection only when handed to an entrypoint:
//!
//! | Primitive | Description |
//! |-----------|-------------|
//! | [`fetch`] | GET a complete route, continue with the response body |
//! | [`submit`] | POST a body to a complete route |
//! | [`concurrent`] | run two sub-programs in parallel and join their values |
//! | [`scoped`] | run a sub-program under a temporarily modified request template |
//! | [`Program::effect`] | embed a host-side computation |
//! | [`Program::abort`] | short-circuit the whole run to `Disconnected` |
//!
//! Sequencing is explicit ([`Program::and_then`], [`Program::map`]); a
//! program is a pure description and building one performs no IO.
//!
//! # Execution
//!
//! [`run`] opens a pooled connection, seeds the request template from
//! [`ConnectionSettings`](gantry_types::ConnectionSettings) (basic auth,
//! 20-second response timeout), and interprets the program, reporting a
//! three-way [`Outcome`](gantry_types::Outcome): a transport failure, a
//! cooperative disconnect, or the completed value. [`run_or_fail`] is the
//! same engine with transport failures left on the error channel.
//!
//! ```no_run
//! use gantry_client::{concurrent, fetch, run};
//! use gantry_types::{ConnectionSettings, Outcome, Route};
//!
//! # async fn overview() {
//! let settings = ConnectionSettings::new("https://ci.example.com", 443, "ops", "t0k3n");
//! let jobs = Route::from("api/json").query("tree", "jobs[name]");
//! let queue = Route::from("queue/api/json");
//!
//! let program = concurrent(fetch(jobs), fetch(queue), |jobs, queue| (jobs, queue));
//! match run(&settings, program).await {
//!     Outcome::Value((_jobs, _queue)) => { /* render */ }
//!     Outcome::Disconnected => eprintln!("program aborted"),
//!     Outcome::Error(error) => eprintln!("transport failure: {error}"),
//! }
//! # }
//! ```
//!
//! # Error handling
//!
//! Exactly one failure class originates here: [`TransportError`], anything
//! that goes wrong at the HTTP layer. The abort primitive is not a failure
//! — it travels through the outcome channel — and failures raised inside
//! embedded effects cross this crate untouched.

mod error;
mod exec;
mod interpret;
pub mod ops;
mod program;
mod template;

pub use error::TransportError;
pub use exec::{run, run_or_fail};
pub use program::{Program, concurrent, fetch, scoped, submit};
pub use template::RequestTemplate;

pub use gantry_types;
