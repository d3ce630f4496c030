pub(crate) mod list;
pub(crate) mod login;
pub(crate) mod meta;
pub(crate) mod output;
pub(crate) mod settings;
pub(crate) mod shared;
pub(crate) mod star;
pub(crate) mod vault;
