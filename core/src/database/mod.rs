pub mod adapter;
pub mod big_result;
pub mod bulk_insert;
pub mod quote;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;
