pub(crate) mod anvil;
