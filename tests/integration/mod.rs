//! Integration tests for the merge workflow.
//!
//! Every test builds a bare "origin" repository and a clone of it in a
//! temporary directory, publishes topic branches to origin and then drives
//! `Workflow` with the real `git` binary. Nothing touches the network.
//!
//! # Test Categories
//!
//! - `merge_flow`: starting a merge, failure handling, review
//! - `complete_flow`: finishing a merge, push and branch cleanup

mod fixtures;

mod complete_flow;
