mod common;
mod phases;
