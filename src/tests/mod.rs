mod detail_tests;
mod pagination_tests;
mod utils;
