pub mod info;
pub mod prune;
pub mod reseal;
pub mod rollover;
pub mod show;
