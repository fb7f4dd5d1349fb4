mod encryption_test;
mod restore_test;
mod store_test;
