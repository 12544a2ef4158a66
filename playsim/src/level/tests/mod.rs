
mod attack_tests;
mod query_tests;
