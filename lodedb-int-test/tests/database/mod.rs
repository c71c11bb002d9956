mod database_test;
mod persistence_test;
