mod registry_tests;
mod scheduler_tests;
