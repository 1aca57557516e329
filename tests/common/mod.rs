#![allow(dead_code)]

pub mod config_test_utils;
pub mod mock_remote;
