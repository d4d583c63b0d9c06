//! End-to-end tests that drive the HTTP API through the full router.
//!
//! Every test here needs a reachable PostgreSQL instance, so they are
//! all `#[ignore]`d. Run them explicitly with
//! `cargo test -- --ignored --test-threads=1`; each `TestApp` wipes the
//! database it opens, so the suite is single-threaded by design.
//! The database comes from `config/test.toml`; override it with
//! `TASKHUB__DATABASE__URL` when your instance lives elsewhere.

mod helpers;

mod auth_test;
mod chat_test;
mod event_test;
mod feed_test;
mod notification_test;
mod permission_test;
mod task_test;
