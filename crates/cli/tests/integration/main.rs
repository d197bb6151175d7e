mod build_tests;
mod clean_tests;
mod common;
mod command_tests;
mod package_tests;
