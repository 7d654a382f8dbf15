#[cfg(test)]
mod aggregate_test;
