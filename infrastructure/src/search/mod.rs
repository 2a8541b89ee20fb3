pub(crate) mod filter;
