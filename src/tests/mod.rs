// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

pub mod chain_tests;
pub mod determinism_tests;
pub mod scenario_tests;
