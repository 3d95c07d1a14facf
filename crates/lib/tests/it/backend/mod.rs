mod encryption;
mod file;
mod gist;
mod memory;
