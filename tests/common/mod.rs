#![allow(dead_code)]

pub mod config_test_utils;
