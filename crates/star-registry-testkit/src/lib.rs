//! # Star Registry Testkit
//!
//! Testing utilities for the Star Registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A chain on a manual clock plus wallets that sign challenges
//! - **Generators**: Proptest strategies for stars and JSON records
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use star_registry_testkit::{TestFixture, TestWallet};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let wallet = TestWallet::new();
//!     let block = fixture
//!         .register_star(&wallet, serde_json::json!({"story": "hello"}))
//!         .await
//!         .unwrap();
//!     assert_eq!(block.height, 1);
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_party_wallets, FixtureChain, TestFixture, TestWallet, FIXTURE_EPOCH};
