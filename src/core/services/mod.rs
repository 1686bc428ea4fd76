pub mod cancel;
pub mod flattener;
pub mod paginated_fetcher;
pub mod pipeline;

#[cfg(test)]
pub mod test_support;
