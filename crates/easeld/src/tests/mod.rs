//! Test suites for the bridge bootstrap, dispatch and process lifecycle.

mod support;
