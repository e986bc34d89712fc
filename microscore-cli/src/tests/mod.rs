//! Shared test harness modules for the micro-score CLI.

use super::*;

mod helpers;
